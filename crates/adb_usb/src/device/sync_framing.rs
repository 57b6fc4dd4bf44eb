use byteorder::{ByteOrder, LittleEndian};
use std::io::{Read, Write};

use super::adb_message_device::{bincode_deserialize_from_slice, bincode_serialize_to_vec};
use super::models::{AdbStatResponse, DirEntry, MessageSubcommand};
use crate::constants::{SYNC_DATA_MAX, SYNC_DENT_LENGTH, SYNC_HEADER_LENGTH, SYNC_PACKET_CAP};
use crate::{ADBError, Result};

/// 8-byte sync request header.
pub(crate) fn sync_header(subcommand: MessageSubcommand, arg: u32) -> Result<Vec<u8>> {
    bincode_serialize_to_vec(subcommand.with_arg(arg))
}

fn word(bytes: &[u8], index: usize) -> u32 {
    LittleEndian::read_u32(&bytes[index * 4..index * 4 + 4])
}

fn fail_message(message: &[u8]) -> ADBError {
    ADBError::SyncFailure(String::from_utf8_lossy(message).into_owned())
}

/// Parse the reply to a STAT request: `STAT`, then mode, size and mtime.
pub(crate) fn parse_stat_response(payload: &[u8]) -> Result<AdbStatResponse> {
    if payload.len() < 16 {
        return Err(ADBError::ProtocolViolation(format!(
            "STAT response has {} bytes, expected 16",
            payload.len()
        )));
    }
    if word(payload, 0) != MessageSubcommand::Stat as u32 {
        return Err(ADBError::ProtocolViolation(format!(
            "STAT response starts with 0x{:08x}",
            word(payload, 0)
        )));
    }
    bincode_deserialize_from_slice(&payload[4..16])
}

/// Check the status the device sends once a pushed file is complete:
/// `OKAY`, or `FAIL<len><message>`.
pub(crate) fn parse_sync_status(payload: &[u8]) -> Result<()> {
    if payload.len() < SYNC_HEADER_LENGTH {
        return Err(ADBError::ProtocolViolation(format!(
            "sync status has {} bytes",
            payload.len()
        )));
    }
    match MessageSubcommand::from_word(word(payload, 0)) {
        Some(MessageSubcommand::Okay) => Ok(()),
        Some(MessageSubcommand::Fail) => {
            let end = (SYNC_HEADER_LENGTH + word(payload, 1) as usize).min(payload.len());
            Err(fail_message(&payload[SYNC_HEADER_LENGTH..end]))
        }
        _ => Err(ADBError::ProtocolViolation(format!(
            "unexpected sync status 0x{:08x}",
            word(payload, 0)
        ))),
    }
}

/// Cuts a file into the WRTE payloads of a sync SEND.
///
/// A packet carries at most [`SYNC_PACKET_CAP`] bytes of markers and content, and
/// at most one `DATA<len>` marker; a DATA block announces at most
/// [`SYNC_DATA_MAX`] bytes and may span many packets. The packet holding the last
/// content byte also carries the `DONE<mtime>` trailer.
#[derive(Debug)]
pub struct SendFramer<R: Read> {
    reader: R,
    mtime: u32,
    block: Vec<u8>,
    offset: usize,
    marker_sent: bool,
    eof: bool,
    finished: bool,
}

impl<R: Read> SendFramer<R> {
    pub fn new(reader: R, mtime: u32) -> Self {
        Self {
            reader,
            mtime,
            block: Vec::new(),
            offset: 0,
            marker_sent: false,
            eof: false,
            finished: false,
        }
    }

    /// Load the next DATA block; leaves an empty block at end of input.
    fn fill_block(&mut self) -> Result<()> {
        self.block.clear();
        self.block.resize(SYNC_DATA_MAX, 0);
        let mut filled = 0;
        while filled < SYNC_DATA_MAX {
            match self.reader.read(&mut self.block[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        self.block.truncate(filled);
        self.offset = 0;
        self.marker_sent = false;
        self.eof = filled == 0;
        Ok(())
    }

    fn block_exhausted(&self) -> bool {
        self.marker_sent && self.offset == self.block.len()
    }

    /// Next WRTE payload, or `None` once the DONE trailer went out.
    pub fn next_packet(&mut self) -> Result<Option<Vec<u8>>> {
        if self.finished {
            return Ok(None);
        }
        if self.block.is_empty() && !self.eof {
            self.fill_block()?;
        }

        let mut packet = Vec::with_capacity(SYNC_PACKET_CAP + SYNC_HEADER_LENGTH);
        let mut marker_in_packet = false;

        while !self.eof && packet.len() < SYNC_PACKET_CAP {
            if self.block_exhausted() {
                self.fill_block()?;
                continue;
            }
            if !self.marker_sent {
                if marker_in_packet || SYNC_PACKET_CAP - packet.len() <= SYNC_HEADER_LENGTH {
                    break;
                }
                let len = u32::try_from(self.block.len())?;
                packet.extend(sync_header(MessageSubcommand::Data, len)?);
                self.marker_sent = true;
                marker_in_packet = true;
            }
            let take = (self.block.len() - self.offset).min(SYNC_PACKET_CAP - packet.len());
            packet.extend_from_slice(&self.block[self.offset..self.offset + take]);
            self.offset += take;
        }

        // look ahead so the trailer rides with the last content
        if !self.eof && self.block_exhausted() {
            self.fill_block()?;
        }
        if self.eof {
            packet.extend(sync_header(MessageSubcommand::Done, self.mtime)?);
            self.finished = true;
        }

        Ok(Some(packet))
    }
}

/// Streaming parser for RECV payloads: `DATA<len><bytes>` blocks closed by
/// `DONE`, or a `FAIL<len><message>` error. Headers may straddle packets.
#[derive(Debug, Default)]
pub struct SyncDataDecoder {
    header: Vec<u8>,
    remaining: usize,
    failure: Option<(usize, Vec<u8>)>,
    done: bool,
}

impl SyncDataDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed one payload, writing file content to `output`. Returns the number of
    /// content bytes written.
    pub fn feed<W: Write>(&mut self, mut chunk: &[u8], output: &mut W) -> Result<u64> {
        let mut written = 0u64;

        while !chunk.is_empty() && !self.done {
            if self.remaining > 0 {
                let take = self.remaining.min(chunk.len());
                output.write_all(&chunk[..take])?;
                written += take as u64;
                self.remaining -= take;
                chunk = &chunk[take..];
                continue;
            }

            if let Some((len, message)) = self.failure.as_mut() {
                let take = (*len - message.len()).min(chunk.len());
                message.extend_from_slice(&chunk[..take]);
                chunk = &chunk[take..];
                if message.len() == *len {
                    return Err(fail_message(message));
                }
                continue;
            }

            let take = (SYNC_HEADER_LENGTH - self.header.len()).min(chunk.len());
            self.header.extend_from_slice(&chunk[..take]);
            chunk = &chunk[take..];
            if self.header.len() < SYNC_HEADER_LENGTH {
                break;
            }

            let id = word(&self.header, 0);
            let arg = word(&self.header, 1) as usize;
            self.header.clear();
            match MessageSubcommand::from_word(id) {
                Some(MessageSubcommand::Data) => self.remaining = arg,
                Some(MessageSubcommand::Done) => self.done = true,
                Some(MessageSubcommand::Fail) if arg == 0 => return Err(fail_message(&[])),
                Some(MessageSubcommand::Fail) => self.failure = Some((arg, Vec::new())),
                _ => {
                    return Err(ADBError::ProtocolViolation(format!(
                        "unexpected sync id 0x{id:08x} in file data"
                    )));
                }
            }
        }

        Ok(written)
    }
}

/// Recover file content from concatenated SEND or RECV payloads.
pub fn strip_sync_framing(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = SyncDataDecoder::new();
    let mut content = Vec::new();
    decoder.feed(bytes, &mut content)?;
    if !decoder.is_done() {
        return Err(ADBError::ProtocolViolation(
            "sync data ended without DONE".into(),
        ));
    }
    Ok(content)
}

/// Streaming parser for LIST replies: `DENT` records until `DONE`.
#[derive(Debug, Default)]
pub struct ListDecoder {
    buffer: Vec<u8>,
    entries: Vec<DirEntry>,
    done: bool,
}

impl ListDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn feed(&mut self, chunk: &[u8]) -> Result<()> {
        self.buffer.extend_from_slice(chunk);

        while !self.done && self.buffer.len() >= 4 {
            let id = word(&self.buffer, 0);
            let consumed = match MessageSubcommand::from_word(id) {
                Some(MessageSubcommand::Done) => {
                    // the DONE record is as long as a DENT one
                    if self.buffer.len() < SYNC_DENT_LENGTH {
                        break;
                    }
                    self.done = true;
                    self.buffer.clear();
                    break;
                }
                Some(MessageSubcommand::Dent) => {
                    if self.buffer.len() < SYNC_DENT_LENGTH {
                        break;
                    }
                    let name_len = word(&self.buffer, 4) as usize;
                    if self.buffer.len() < SYNC_DENT_LENGTH + name_len {
                        break;
                    }
                    let name = &self.buffer[SYNC_DENT_LENGTH..SYNC_DENT_LENGTH + name_len];
                    self.entries.push(DirEntry::new(
                        word(&self.buffer, 1),
                        word(&self.buffer, 2),
                        word(&self.buffer, 3),
                        String::from_utf8(name.to_vec())?,
                    ));
                    SYNC_DENT_LENGTH + name_len
                }
                Some(MessageSubcommand::Fail) => {
                    if self.buffer.len() < SYNC_HEADER_LENGTH {
                        break;
                    }
                    let len = word(&self.buffer, 1) as usize;
                    if self.buffer.len() < SYNC_HEADER_LENGTH + len {
                        break;
                    }
                    return Err(fail_message(
                        &self.buffer[SYNC_HEADER_LENGTH..SYNC_HEADER_LENGTH + len],
                    ));
                }
                _ => {
                    return Err(ADBError::ProtocolViolation(format!(
                        "unexpected sync id 0x{id:08x} in directory listing"
                    )));
                }
            };
            self.buffer.drain(..consumed);
        }

        Ok(())
    }

    pub fn into_entries(self) -> Vec<DirEntry> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn packets(content: &[u8], mtime: u32) -> Vec<Vec<u8>> {
        let mut framer = SendFramer::new(Cursor::new(content.to_vec()), mtime);
        let mut packets = Vec::new();
        while let Some(packet) = framer.next_packet().unwrap() {
            packets.push(packet);
        }
        packets
    }

    fn count_markers(packet: &[u8]) -> usize {
        // markers sit at block boundaries, only test content without 'DATA' bytes
        packet.windows(4).filter(|w| w == b"DATA").count()
    }

    #[test]
    fn small_file_is_one_packet() {
        let packets = packets(b"hello", 1_700_000_000);
        assert_eq!(packets.len(), 1);
        let packet = &packets[0];
        assert_eq!(&packet[..4], b"DATA");
        assert_eq!(word(packet, 1), 5);
        assert_eq!(&packet[8..13], b"hello");
        assert_eq!(&packet[13..17], b"DONE");
        assert_eq!(word(&packet[13..], 1), 1_700_000_000);
    }

    #[test]
    fn empty_file_sends_only_done() {
        let packets = packets(b"", 42);
        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0].len(), SYNC_HEADER_LENGTH);
        assert_eq!(&packets[0][..4], b"DONE");
        assert_eq!(strip_sync_framing(&packets[0]).unwrap(), b"");
    }

    #[test]
    fn large_file_respects_caps() {
        let content: Vec<u8> = (0..200_000u32).map(|i| (i % 26) as u8 + b'a').collect();
        let packets = packets(&content, 7);

        let last = packets.len() - 1;
        for (i, packet) in packets.iter().enumerate() {
            let trailer = if i == last { SYNC_HEADER_LENGTH } else { 0 };
            assert!(packet.len() <= SYNC_PACKET_CAP + trailer, "packet {i}");
            assert!(count_markers(packet) <= 1, "packet {i}");
        }
        assert!(packets[last].ends_with(&sync_header(MessageSubcommand::Done, 7).unwrap()));

        // 200000 bytes need four DATA blocks
        let markers: usize = packets.iter().map(|p| count_markers(p)).sum();
        assert_eq!(markers, 4);

        assert_eq!(strip_sync_framing(&packets.concat()).unwrap(), content);
    }

    #[test]
    fn data_blocks_never_exceed_64k() {
        let content = vec![b'x'; SYNC_DATA_MAX + 1];
        let stream = packets(&content, 0).concat();
        assert_eq!(&stream[..4], b"DATA");
        assert_eq!(word(&stream, 1) as usize, SYNC_DATA_MAX);
    }

    #[test]
    fn decoder_handles_split_headers() {
        let mut stream = Vec::new();
        stream.extend(sync_header(MessageSubcommand::Data, 3).unwrap());
        stream.extend_from_slice(b"abc");
        stream.extend(sync_header(MessageSubcommand::Data, 2).unwrap());
        stream.extend_from_slice(b"de");
        stream.extend(sync_header(MessageSubcommand::Done, 0).unwrap());

        for split in 1..stream.len() {
            let mut decoder = SyncDataDecoder::new();
            let mut output = Vec::new();
            let mut total = decoder.feed(&stream[..split], &mut output).unwrap();
            total += decoder.feed(&stream[split..], &mut output).unwrap();
            assert!(decoder.is_done(), "split at {split}");
            assert_eq!(output, b"abcde");
            assert_eq!(total, 5);
        }
    }

    #[test]
    fn decoder_surfaces_fail() {
        let mut stream = sync_header(MessageSubcommand::Fail, 14).unwrap();
        stream.extend_from_slice(b"No such file!!");
        let mut decoder = SyncDataDecoder::new();
        let err = decoder.feed(&stream, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, ADBError::SyncFailure(msg) if msg == "No such file!!"));
    }

    #[test]
    fn decoder_rejects_unknown_ids() {
        let mut decoder = SyncDataDecoder::new();
        assert!(matches!(
            decoder.feed(b"ABCD\0\0\0\0", &mut Vec::new()),
            Err(ADBError::ProtocolViolation(_))
        ));
    }

    fn dent(mode: u32, size: u32, mtime: u32, name: &str) -> Vec<u8> {
        let mut record = b"DENT".to_vec();
        for value in [mode, size, mtime, name.len() as u32] {
            record.extend_from_slice(&value.to_le_bytes());
        }
        record.extend_from_slice(name.as_bytes());
        record
    }

    #[test]
    fn list_records_split_across_packets() {
        let mut stream = dent(0o100644, 10, 1, "file1");
        stream.extend(dent(0o040755, 4096, 2, "folder1"));
        stream.extend_from_slice(b"DONE");
        stream.extend_from_slice(&[0u8; 16]);

        let mut decoder = ListDecoder::new();
        for piece in stream.chunks(7) {
            decoder.feed(piece).unwrap();
        }
        assert!(decoder.is_done());
        let entries = decoder.into_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].filename, "file1");
        assert_eq!(entries[1].filename, "folder1");
        assert!(entries[1].is_directory());
        assert_eq!(entries[1].size, 4096);
    }

    #[test]
    fn list_done_record_split_across_packets() {
        let mut stream = dent(0o100644, 1, 1, "a");
        stream.extend_from_slice(b"DONE");

        let mut decoder = ListDecoder::new();
        decoder.feed(&stream).unwrap();
        assert!(!decoder.is_done());

        decoder.feed(&[0u8; 16]).unwrap();
        assert!(decoder.is_done());
        assert_eq!(decoder.into_entries().len(), 1);
    }

    #[test]
    fn push_status() {
        assert!(parse_sync_status(&sync_header(MessageSubcommand::Okay, 0).unwrap()).is_ok());

        let mut fail = sync_header(MessageSubcommand::Fail, 17).unwrap();
        fail.extend_from_slice(b"Permission denied");
        assert!(matches!(
            parse_sync_status(&fail),
            Err(ADBError::SyncFailure(msg)) if msg == "Permission denied"
        ));
        assert!(parse_sync_status(b"OKAY").is_err());
    }

    #[test]
    fn stat_response_parsing() {
        let mut payload = b"STAT".to_vec();
        for value in [0o100644u32, 1234, 1_600_000_000] {
            payload.extend_from_slice(&value.to_le_bytes());
        }
        let stat = parse_stat_response(&payload).unwrap();
        assert!(stat.exists());
        assert!(stat.is_file());
        assert_eq!(stat.size, 1234);
        assert_eq!(stat.mtime, 1_600_000_000);

        assert!(parse_stat_response(&payload[..10]).is_err());
        payload[..4].copy_from_slice(b"FAIL");
        assert!(parse_stat_response(&payload).is_err());
    }
}
