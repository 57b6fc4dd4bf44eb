use crate::device::ADBMessageDevice;
use crate::{ADBMessageTransport, Result};

impl<T: ADBMessageTransport> ADBMessageDevice<T> {
    /// Ask the device to reboot. The device drops off the bus, so the
    /// connection is released once the stream is accepted.
    pub(crate) fn reboot_device(&mut self) -> Result<()> {
        self.with_stream("reboot:", |_| Ok(()))?;
        log::info!("device is rebooting");
        self.on_reboot();
        Ok(())
    }
}
