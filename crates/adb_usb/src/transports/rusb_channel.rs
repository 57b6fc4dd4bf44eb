use rusb::{Device, DeviceHandle, GlobalContext};
use std::time::Duration;

use super::traits::BulkChannel;
use crate::usb::AdbInterface;
use crate::{ADBError, Result};

/// Bulk endpoints of an ADB interface, reached through libusb.
///
/// The device handle is only opened by [`claim`](BulkChannel::claim) and is closed
/// again by [`release`](BulkChannel::release) or on drop.
pub struct RusbChannel {
    device: Device<GlobalContext>,
    interface: AdbInterface,
    handle: Option<DeviceHandle<GlobalContext>>,
}

impl RusbChannel {
    pub fn new(device: Device<GlobalContext>, interface: AdbInterface) -> Self {
        Self {
            device,
            interface,
            handle: None,
        }
    }

    pub fn interface(&self) -> &AdbInterface {
        &self.interface
    }

    pub fn is_claimed(&self) -> bool {
        self.handle.is_some()
    }

    fn handle(&self) -> Result<&DeviceHandle<GlobalContext>> {
        self.handle
            .as_ref()
            .ok_or(ADBError::DeviceUnavailable(rusb::Error::NoDevice))
    }
}

impl BulkChannel for RusbChannel {
    fn claim(&mut self) -> Result<()> {
        if self.handle.is_some() {
            return Ok(());
        }

        let mut handle = self.device.open().map_err(ADBError::DeviceUnavailable)?;

        // libusb on macOS only lets us claim the adb interface once interface 0
        // has been claimed on the same handle
        #[cfg(target_os = "macos")]
        let _ = handle
            .claim_interface(0)
            .inspect_err(|e| log::debug!("pre-claim of interface 0 failed: {e}"));

        #[cfg(not(target_os = "windows"))]
        let _ = handle
            .set_auto_detach_kernel_driver(true)
            .inspect_err(|e| log::debug!("kernel driver auto-detach unavailable: {e}"));

        handle
            .claim_interface(self.interface.number)
            .map_err(ADBError::DeviceUnavailable)?;

        if let Err(e) = handle.set_alternate_setting(self.interface.number, 0) {
            log::debug!("could not select alternate setting 0: {e}");
        }

        log::debug!(
            "claimed interface {} (in=0x{:02x}, out=0x{:02x})",
            self.interface.number,
            self.interface.bulk_in,
            self.interface.bulk_out
        );
        self.handle = Some(handle);
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.release_interface(self.interface.number) {
                log::warn!("failed to release interface {}: {e}", self.interface.number);
            }
            // dropping the handle closes the device
            log::debug!("released interface {}", self.interface.number);
        }
        Ok(())
    }

    fn read_bulk(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        let endpoint = self.interface.bulk_in;
        Ok(self.handle()?.read_bulk(endpoint, buf, timeout)?)
    }

    fn write_bulk(&mut self, data: &[u8], timeout: Duration) -> Result<usize> {
        let endpoint = self.interface.bulk_out;
        Ok(self.handle()?.write_bulk(endpoint, data, timeout)?)
    }
}

impl Drop for RusbChannel {
    fn drop(&mut self) {
        let _ = self.release();
    }
}

impl std::fmt::Debug for RusbChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RusbChannel")
            .field("bus", &self.device.bus_number())
            .field("address", &self.device.address())
            .field("interface", &self.interface)
            .field("claimed", &self.is_claimed())
            .finish()
    }
}
