use serde::{Deserialize, Serialize};

use super::adb_message_device::{bincode_deserialize_from_slice, bincode_serialize_to_vec};
use super::models::MessageCommand;
use crate::constants::ADB_HEADER_LENGTH;
use crate::{ADBError, Result};

pub const AUTH_TOKEN: u32 = 1;
pub const AUTH_SIGNATURE: u32 = 2;
pub const AUTH_RSAPUBLICKEY: u32 = 3;

/// An ADB packet: fixed 24-byte header plus optional payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ADBTransportMessage {
    header: ADBTransportMessageHeader,
    payload: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(C)]
pub struct ADBTransportMessageHeader {
    command: MessageCommand, /* command identifier constant      */
    arg0: u32,               /* first argument                   */
    arg1: u32,               /* second argument                  */
    data_length: u32,        /* length of payload (0 is allowed) */
    data_crc32: u32,         /* additive checksum of payload     */
    magic: u32,              /* command ^ 0xffffffff             */
}

/// Header as it sits on the wire, before the command word is validated.
#[derive(Deserialize)]
struct RawHeader {
    command: u32,
    arg0: u32,
    arg1: u32,
    data_length: u32,
    data_crc32: u32,
    magic: u32,
}

impl ADBTransportMessageHeader {
    pub fn new(command: MessageCommand, arg0: u32, arg1: u32, data: &[u8]) -> Self {
        Self {
            command,
            arg0,
            arg1,
            data_length: data.len() as u32,
            data_crc32: Self::compute_crc32(data),
            magic: Self::compute_magic(command),
        }
    }

    pub fn command(&self) -> MessageCommand {
        self.command
    }

    pub fn arg0(&self) -> u32 {
        self.arg0
    }

    pub fn arg1(&self) -> u32 {
        self.arg1
    }

    pub fn data_length(&self) -> u32 {
        self.data_length
    }

    pub fn data_crc32(&self) -> u32 {
        self.data_crc32
    }

    pub fn magic(&self) -> u32 {
        self.magic
    }

    /// Sum of all payload bytes, modulo 2^32.
    pub fn compute_crc32(data: &[u8]) -> u32 {
        data.iter().fold(0u32, |acc, &byte| acc.wrapping_add(u32::from(byte)))
    }

    pub fn compute_magic(command: MessageCommand) -> u32 {
        command as u32 ^ 0xFFFF_FFFF
    }

    pub fn check_message_integrity(&self) -> bool {
        Self::compute_magic(self.command) == self.magic
    }

    pub fn as_bytes(&self) -> Result<Vec<u8>> {
        bincode_serialize_to_vec(self)
    }
}

impl TryFrom<&[u8]> for ADBTransportMessageHeader {
    type Error = ADBError;

    fn try_from(value: &[u8]) -> Result<Self> {
        if value.len() < ADB_HEADER_LENGTH {
            return Err(ADBError::TruncatedHeader(value.len()));
        }

        let raw: RawHeader = bincode_deserialize_from_slice(&value[..ADB_HEADER_LENGTH])?;
        let command = MessageCommand::try_from(raw.command)?;
        let header = Self {
            command,
            arg0: raw.arg0,
            arg1: raw.arg1,
            data_length: raw.data_length,
            data_crc32: raw.data_crc32,
            magic: raw.magic,
        };

        if !header.check_message_integrity() {
            return Err(ADBError::InvalidMagic(
                Self::compute_magic(command),
                header.magic,
            ));
        }

        Ok(header)
    }
}

impl ADBTransportMessage {
    pub fn new(command: MessageCommand, arg0: u32, arg1: u32, data: &[u8]) -> Self {
        Self {
            header: ADBTransportMessageHeader::new(command, arg0, arg1, data),
            payload: data.to_vec(),
        }
    }

    /// Attach a payload received separately from its header.
    pub fn from_header_and_payload(header: ADBTransportMessageHeader, payload: Vec<u8>) -> Self {
        Self { header, payload }
    }

    pub fn header(&self) -> &ADBTransportMessageHeader {
        &self.header
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    /// Whether every payload byte announced by the header is present.
    pub fn is_complete(&self) -> bool {
        self.payload.len() == self.header.data_length as usize
    }

    /// Check the payload against the header's checksum.
    ///
    /// A zero checksum is accepted: devices speaking newer protocol versions
    /// leave the field empty.
    pub fn verify_payload(&self) -> Result<()> {
        if !self.is_complete() {
            return Err(ADBError::ProtocolViolation(format!(
                "payload has {} bytes, header announced {}",
                self.payload.len(),
                self.header.data_length
            )));
        }
        let computed = ADBTransportMessageHeader::compute_crc32(&self.payload);
        if self.header.data_crc32 != 0 && computed != self.header.data_crc32 {
            return Err(ADBError::InvalidChecksum(computed, self.header.data_crc32));
        }
        Ok(())
    }
}

/// Encode a packet from a raw opcode: header followed by payload.
///
/// Fails with [`ADBError::InvalidCommand`] for opcodes this client does not speak.
pub fn encode_message(command: u32, arg0: u32, arg1: u32, payload: &[u8]) -> Result<Vec<u8>> {
    let command = MessageCommand::try_from(command)?;
    let header = ADBTransportMessageHeader::new(command, arg0, arg1, payload);
    let mut bytes = header.as_bytes()?;
    bytes.extend_from_slice(payload);
    Ok(bytes)
}

/// Decode a packet from a buffer holding at least its header.
///
/// Payload bytes following the header are attached up to `data_length`; when the
/// buffer stops short the returned message is not [`complete`](ADBTransportMessage::is_complete)
/// and the transport appends the rest.
pub fn decode_message(bytes: &[u8]) -> Result<ADBTransportMessage> {
    let header = ADBTransportMessageHeader::try_from(bytes)?;
    let available = &bytes[ADB_HEADER_LENGTH..];
    let take = available.len().min(header.data_length as usize);
    Ok(ADBTransportMessage::from_header_and_payload(
        header,
        available[..take].to_vec(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn header_layout() {
        let message = ADBTransportMessage::new(MessageCommand::Open, 12345, 0, b"sync:\0");
        let bytes = message.header().as_bytes().unwrap();
        assert_eq!(bytes.len(), ADB_HEADER_LENGTH);
        assert_eq!(&bytes[0..4], b"OPEN");
        assert_eq!(&bytes[4..8], &12345u32.to_le_bytes());
        assert_eq!(&bytes[8..12], &0u32.to_le_bytes());
        assert_eq!(&bytes[12..16], &6u32.to_le_bytes());
        assert_eq!(
            u32::from_le_bytes(bytes[20..24].try_into().unwrap()),
            0xFFFF_FFFF - MessageCommand::Open as u32
        );
    }

    #[test]
    fn encode_decode_roundtrip() {
        let cases: [(MessageCommand, u32, u32, &[u8]); 4] = [
            (MessageCommand::Cnxn, 0x0100_0000, 4096, b"host::\0"),
            (MessageCommand::Write, 7, 12345, b"STAT\x04\x00\x00\x00"),
            (MessageCommand::Okay, 1, 2, b""),
            (MessageCommand::Clse, u32::MAX, 0, b""),
        ];
        for (command, arg0, arg1, payload) in cases {
            let bytes = encode_message(command as u32, arg0, arg1, payload).unwrap();
            let decoded = decode_message(&bytes).unwrap();
            assert_eq!(decoded.header().command(), command);
            assert_eq!(decoded.header().arg0(), arg0);
            assert_eq!(decoded.header().arg1(), arg1);
            assert_eq!(decoded.payload(), payload);
            assert_eq!(decoded.header().magic(), 0xFFFF_FFFF - command as u32);
            assert!(decoded.is_complete());
        }
    }

    #[test]
    fn checksum_is_additive_sum() {
        let mut rng = rand::rng();
        for _ in 0..32 {
            let len = rng.random_range(0..8192);
            let payload: Vec<u8> = (0..len).map(|_| rng.random()).collect();
            let expected = payload
                .iter()
                .map(|&b| u64::from(b))
                .sum::<u64>()
                % (1u64 << 32);
            let message = ADBTransportMessage::new(MessageCommand::Write, 0, 0, &payload);
            assert_eq!(u64::from(message.header().data_crc32()), expected);
            assert_eq!(message.header().data_length() as usize, payload.len());
        }
    }

    #[test]
    fn checksum_wraps() {
        let payload = vec![0xFF; (u32::MAX as usize / 0xFF) + 2];
        let expected = (payload.len() as u64 * 0xFF % (1u64 << 32)) as u32;
        assert_eq!(ADBTransportMessageHeader::compute_crc32(&payload), expected);
    }

    #[test]
    fn empty_payload_has_no_length_and_no_checksum() {
        let message = ADBTransportMessage::new(MessageCommand::Okay, 1, 2, &[]);
        assert_eq!(message.header().data_length(), 0);
        assert_eq!(message.header().data_crc32(), 0);
    }

    #[test]
    fn invalid_command_rejected() {
        for bad in [0u32, 1, 0x434e_5953, u32::from_le_bytes(*b"STAT")] {
            assert!(matches!(
                encode_message(bad, 0, 0, b"payload"),
                Err(ADBError::InvalidCommand(c)) if c == bad
            ));
        }
    }

    #[test]
    fn truncated_header_rejected() {
        let bytes = encode_message(MessageCommand::Okay as u32, 0, 0, &[]).unwrap();
        assert!(matches!(
            decode_message(&bytes[..23]),
            Err(ADBError::TruncatedHeader(23))
        ));
    }

    #[test]
    fn bad_magic_rejected() {
        let mut bytes = encode_message(MessageCommand::Okay as u32, 0, 0, &[]).unwrap();
        bytes[20] ^= 0xFF;
        assert!(matches!(
            decode_message(&bytes),
            Err(ADBError::InvalidMagic(_, _))
        ));
    }

    #[test]
    fn partial_payload_is_incomplete() {
        let bytes = encode_message(MessageCommand::Write as u32, 1, 2, b"abcdef").unwrap();
        let decoded = decode_message(&bytes[..ADB_HEADER_LENGTH + 2]).unwrap();
        assert_eq!(decoded.payload(), b"ab");
        assert!(!decoded.is_complete());
        assert!(decoded.verify_payload().is_err());
    }

    #[test]
    fn checksum_mismatch_detected() {
        let header = ADBTransportMessageHeader::new(MessageCommand::Write, 0, 0, b"abc");
        let message = ADBTransportMessage::from_header_and_payload(header, b"abd".to_vec());
        assert!(matches!(
            message.verify_payload(),
            Err(ADBError::InvalidChecksum(_, _))
        ));
    }
}
