use std::io::{Read, Write};
use std::path::Path;

use super::models::{ADBCommand, AdbStatResponse, CommandOutput, DirEntry};
use super::{ADBDeviceExt, ADBMessageDevice, AuthCredentials, ConnectionState};
use crate::config::ConnectionConfig;
use crate::transports::{RusbChannel, USBTransport};
use crate::usb::{AdbDeviceInfo, AdbUsbDevice, find_by_serial, search_adb_devices};
use crate::{ADBError, Result};

/// Represent a device reached over USB.
#[derive(Debug)]
pub struct ADBUSBDevice {
    inner: ADBMessageDevice<USBTransport<RusbChannel>>,
    info: AdbDeviceInfo,
}

impl ADBUSBDevice {
    /// Wrap a discovered device. Nothing is claimed until [`connect`](Self::connect).
    pub fn from_usb_device(
        device: AdbUsbDevice,
        credentials: AuthCredentials,
        config: ConnectionConfig,
    ) -> Self {
        let info = device.info().clone();
        let transport = USBTransport::new(device.into_channel(), &config);
        Self {
            inner: ADBMessageDevice::new(transport, credentials, config),
            info,
        }
    }

    /// Device with the given vendor and product ids, using the keys in `~/.android`.
    pub fn new(vendor_id: u16, product_id: u16) -> Result<Self> {
        Self::new_with_config(
            vendor_id,
            product_id,
            AuthCredentials::from_default_paths()?,
            ConnectionConfig::default(),
        )
    }

    pub fn new_with_config(
        vendor_id: u16,
        product_id: u16,
        credentials: AuthCredentials,
        config: ConnectionConfig,
    ) -> Result<Self> {
        // explicit ids bypass the vendor table
        let device = search_adb_devices(false)?
            .into_iter()
            .find(|d| d.info().vendor_id == vendor_id && d.info().product_id == product_id)
            .ok_or(ADBError::DeviceNotFound)?;
        Ok(Self::from_usb_device(device, credentials, config))
    }

    /// First ADB device found on the bus.
    pub fn autodetect() -> Result<Self> {
        Self::autodetect_with_config(
            AuthCredentials::from_default_paths()?,
            ConnectionConfig::default(),
        )
    }

    pub fn autodetect_with_config(
        credentials: AuthCredentials,
        config: ConnectionConfig,
    ) -> Result<Self> {
        let mut devices = search_adb_devices(config.restrict_to_known_vendors)?;
        if devices.len() > 1 {
            log::warn!(
                "{} adb devices found, using the first one; select by serial to choose",
                devices.len()
            );
        }
        if devices.is_empty() {
            return Err(ADBError::DeviceNotFound);
        }
        Ok(Self::from_usb_device(devices.remove(0), credentials, config))
    }

    /// Device whose USB serial number is `serial`.
    pub fn from_serial(serial: &str) -> Result<Self> {
        let config = ConnectionConfig::default();
        let device = find_by_serial(serial, config.restrict_to_known_vendors)?;
        Ok(Self::from_usb_device(
            device,
            AuthCredentials::from_default_paths()?,
            config,
        ))
    }

    pub fn info(&self) -> &AdbDeviceInfo {
        &self.info
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.state()
    }

    pub fn banner(&self) -> Option<&str> {
        self.inner.banner()
    }

    pub fn connect(&mut self) -> Result<()> {
        self.inner.connect()
    }

    pub fn run_command(&mut self, command: ADBCommand) -> Result<CommandOutput> {
        self.inner.run_command(command)
    }

    pub fn close_connection(&mut self) -> Result<()> {
        self.inner.close_connection()
    }
}

impl ADBDeviceExt for ADBUSBDevice {
    fn shell_command(&mut self, command: &[&str], output: &mut dyn Write) -> Result<()> {
        self.inner.shell_command(command, output)
    }

    fn stat(&mut self, remote_path: &str) -> Result<AdbStatResponse> {
        self.inner.stat(remote_path)
    }

    fn pull(&mut self, source: &dyn AsRef<str>, output: &mut dyn Write) -> Result<Option<u64>> {
        self.inner.pull(source, output)
    }

    fn push(&mut self, stream: &mut dyn Read, path: &dyn AsRef<str>) -> Result<()> {
        self.inner.push(stream, path)
    }

    fn list(&mut self, path: &dyn AsRef<str>) -> Result<Vec<DirEntry>> {
        self.inner.list(path)
    }

    fn install(&mut self, apk_path: &dyn AsRef<Path>) -> Result<String> {
        self.inner.install(apk_path)
    }

    fn uninstall(&mut self, package: &str) -> Result<String> {
        self.inner.uninstall(package)
    }

    fn reboot(&mut self) -> Result<()> {
        self.inner.reboot()
    }
}
