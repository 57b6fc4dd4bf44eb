use std::time::Duration;

use crate::Result;
use crate::constants::DEFAULT_TRANSFER_TIMEOUT;
use crate::device::ADBTransportMessage;

/// Trait representing a transport that can be claimed and released.
pub trait ADBTransport {
    /// Claim the device. Calling it on an already claimed transport is a no-op.
    fn connect(&mut self) -> Result<()>;

    /// Release the device. Must be safe to call on every exit path, claimed or not.
    fn disconnect(&mut self) -> Result<()>;
}

/// Trait representing a transport able to read and write whole ADB packets.
pub trait ADBMessageTransport: ADBTransport {
    /// Read one packet, payload fully reassembled.
    fn read_message_with_timeout(&mut self, read_timeout: Duration) -> Result<ADBTransportMessage>;

    /// Write one packet: header transfer, then payload transfer when not empty.
    fn write_message_with_timeout(
        &mut self,
        message: ADBTransportMessage,
        write_timeout: Duration,
    ) -> Result<()>;

    fn default_timeout(&self) -> Duration {
        DEFAULT_TRANSFER_TIMEOUT
    }

    fn read_message(&mut self) -> Result<ADBTransportMessage> {
        let timeout = self.default_timeout();
        self.read_message_with_timeout(timeout)
    }

    fn write_message(&mut self, message: ADBTransportMessage) -> Result<()> {
        let timeout = self.default_timeout();
        self.write_message_with_timeout(message, timeout)
    }
}

/// A pair of bulk endpoints on a claimed USB interface.
pub trait BulkChannel {
    fn claim(&mut self) -> Result<()>;

    fn release(&mut self) -> Result<()>;

    /// One bulk IN transfer; returns the number of bytes received.
    fn read_bulk(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// One bulk OUT transfer; returns the number of bytes sent.
    fn write_bulk(&mut self, data: &[u8], timeout: Duration) -> Result<usize>;
}
