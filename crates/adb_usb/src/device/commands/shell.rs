use crate::device::ADBMessageDevice;
use crate::{ADBMessageTransport, Result};

impl<T: ADBMessageTransport> ADBMessageDevice<T> {
    /// Run `command` and collect everything it writes until the device closes
    /// the stream.
    pub(crate) fn run_shell(&mut self, command: &str) -> Result<Vec<u8>> {
        self.with_stream(&format!("shell:{command}"), |session| {
            session.read_to_end()
        })
    }
}
