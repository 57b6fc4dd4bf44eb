use std::time::Duration;

use super::rusb_channel::RusbChannel;
use super::traits::{ADBMessageTransport, ADBTransport, BulkChannel};
use crate::config::ConnectionConfig;
use crate::constants::ADB_HEADER_LENGTH;
use crate::device::{ADBTransportMessage, decode_message};
use crate::{ADBError, Result};

/// Carries ADB packets over a pair of bulk endpoints.
///
/// Bulk reads are bounded by `max_read`, far below the largest payload a device
/// may announce, so payloads are reassembled from as many reads as it takes.
#[derive(Debug)]
pub struct USBTransport<C: BulkChannel = RusbChannel> {
    channel: C,
    timeout: Duration,
    max_read: usize,
}

impl<C: BulkChannel> USBTransport<C> {
    pub fn new(channel: C, config: &ConnectionConfig) -> Self {
        Self {
            channel,
            timeout: config.transfer_timeout,
            max_read: (config.max_payload as usize).max(ADB_HEADER_LENGTH),
        }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    fn write_all(&mut self, mut data: &[u8], timeout: Duration) -> Result<()> {
        while !data.is_empty() {
            let written = self.channel.write_bulk(data, timeout)?;
            if written == 0 {
                return Err(ADBError::ProtocolViolation(
                    "bulk write accepted no bytes".into(),
                ));
            }
            data = &data[written..];
        }
        Ok(())
    }
}

impl<C: BulkChannel> ADBTransport for USBTransport<C> {
    fn connect(&mut self) -> Result<()> {
        self.channel.claim()
    }

    fn disconnect(&mut self) -> Result<()> {
        self.channel.release()
    }
}

impl<C: BulkChannel> ADBMessageTransport for USBTransport<C> {
    fn read_message_with_timeout(&mut self, read_timeout: Duration) -> Result<ADBTransportMessage> {
        let mut buffer = vec![0u8; self.max_read];

        let received = self.channel.read_bulk(&mut buffer, read_timeout)?;
        if received < ADB_HEADER_LENGTH {
            return Err(ADBError::TruncatedHeader(received));
        }
        let message = decode_message(&buffer[..received])?;
        let header = *message.header();
        let expected = header.data_length() as usize;
        let mut payload = message.into_payload();

        while payload.len() < expected {
            let received = self.channel.read_bulk(&mut buffer, read_timeout)?;
            if received == 0 {
                return Err(ADBError::ProtocolViolation(format!(
                    "empty read with {} payload bytes outstanding",
                    expected - payload.len()
                )));
            }
            if payload.len() + received > expected {
                return Err(ADBError::ProtocolViolation(format!(
                    "received {} bytes beyond the announced payload",
                    payload.len() + received - expected
                )));
            }
            payload.extend_from_slice(&buffer[..received]);
        }

        let message = ADBTransportMessage::from_header_and_payload(header, payload);
        message.verify_payload()?;
        log::trace!(
            "recv {} arg0={} arg1={} len={}",
            header.command(),
            header.arg0(),
            header.arg1(),
            expected
        );
        Ok(message)
    }

    fn write_message_with_timeout(
        &mut self,
        message: ADBTransportMessage,
        write_timeout: Duration,
    ) -> Result<()> {
        let header = message.header();
        log::trace!(
            "send {} arg0={} arg1={} len={}",
            header.command(),
            header.arg0(),
            header.arg1(),
            header.data_length()
        );
        let header_bytes = header.as_bytes()?;
        self.write_all(&header_bytes, write_timeout)?;
        if !message.payload().is_empty() {
            self.write_all(message.payload(), write_timeout)?;
        }
        Ok(())
    }

    fn default_timeout(&self) -> Duration {
        self.timeout
    }
}
