use rusb::{Device, DeviceDescriptor, Direction, GlobalContext, TransferType, UsbContext};

use super::usb_vendors::is_known_vendor;
use crate::transports::RusbChannel;
use crate::{ADBError, Result};

pub const ADB_CLASS: u8 = 0xff;
pub const ADB_SUBCLASS: u8 = 0x42;
pub const ADB_PROTOCOL: u8 = 0x01;

/// Interface number and bulk endpoint addresses of an ADB interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdbInterface {
    pub number: u8,
    pub bulk_in: u8,
    pub bulk_out: u8,
}

/// Descriptor fields needed to recognize an ADB endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointSummary {
    pub address: u8,
    pub direction: Direction,
    pub transfer_type: TransferType,
}

/// Descriptor fields needed to recognize an ADB interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceSummary {
    pub number: u8,
    pub class: u8,
    pub subclass: u8,
    pub protocol: u8,
    pub endpoints: Vec<EndpointSummary>,
}

/// Return the endpoints of `interface` if it is an ADB interface: vendor class
/// 0xff, subclass 0x42, protocol 0x01, and exactly two bulk endpoints, one per
/// direction.
pub fn match_adb_interface(interface: &InterfaceSummary) -> Option<AdbInterface> {
    if interface.class != ADB_CLASS
        || interface.subclass != ADB_SUBCLASS
        || interface.protocol != ADB_PROTOCOL
        || interface.endpoints.len() != 2
    {
        return None;
    }

    let endpoint = |direction: Direction| {
        interface
            .endpoints
            .iter()
            .find(|e| e.direction == direction && e.transfer_type == TransferType::Bulk)
            .map(|e| e.address)
    };

    Some(AdbInterface {
        number: interface.number,
        bulk_in: endpoint(Direction::In)?,
        bulk_out: endpoint(Direction::Out)?,
    })
}

fn interface_summaries<T: UsbContext>(
    device: &Device<T>,
    descriptor: &DeviceDescriptor,
) -> Vec<InterfaceSummary> {
    let mut summaries = Vec::new();
    for index in 0..descriptor.num_configurations() {
        let Ok(config) = device.config_descriptor(index) else {
            continue;
        };
        for interface in config.interfaces() {
            for setting in interface.descriptors() {
                summaries.push(InterfaceSummary {
                    number: setting.interface_number(),
                    class: setting.class_code(),
                    subclass: setting.sub_class_code(),
                    protocol: setting.protocol_code(),
                    endpoints: setting
                        .endpoint_descriptors()
                        .map(|e| EndpointSummary {
                            address: e.address(),
                            direction: e.direction(),
                            transfer_type: e.transfer_type(),
                        })
                        .collect(),
                });
            }
        }
    }
    summaries
}

/// First ADB interface exposed by `device`, across all its configurations.
pub fn find_adb_interface<T: UsbContext>(
    device: &Device<T>,
    descriptor: &DeviceDescriptor,
) -> Option<AdbInterface> {
    interface_summaries(device, descriptor)
        .iter()
        .find_map(match_adb_interface)
}

pub fn is_adb_device<T: UsbContext>(device: &Device<T>, descriptor: &DeviceDescriptor) -> bool {
    find_adb_interface(device, descriptor).is_some()
}

/// What discovery knows about an ADB capable device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdbDeviceInfo {
    pub vendor_id: u16,
    pub product_id: u16,
    pub bus: u8,
    pub address: u8,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub serial: Option<String>,
    pub interface: AdbInterface,
}

impl AdbDeviceInfo {
    fn from_usb_device<T: UsbContext>(
        device: &Device<T>,
        descriptor: &DeviceDescriptor,
        interface: AdbInterface,
    ) -> Self {
        // string descriptors need an open handle; devices we lack permission
        // for are still listed, without strings
        let (manufacturer, product, serial) = device
            .open()
            .ok()
            .map(|handle| {
                (
                    handle.read_manufacturer_string_ascii(descriptor).ok(),
                    handle.read_product_string_ascii(descriptor).ok(),
                    handle.read_serial_number_string_ascii(descriptor).ok(),
                )
            })
            .unwrap_or((None, None, None));

        Self {
            vendor_id: descriptor.vendor_id(),
            product_id: descriptor.product_id(),
            bus: device.bus_number(),
            address: device.address(),
            manufacturer,
            product,
            serial,
            interface,
        }
    }
}

impl AsRef<AdbDeviceInfo> for AdbDeviceInfo {
    fn as_ref(&self) -> &AdbDeviceInfo {
        self
    }
}

/// A discovered device together with the handle needed to claim it.
#[derive(Debug)]
pub struct AdbUsbDevice {
    device: Device<GlobalContext>,
    info: AdbDeviceInfo,
}

impl AdbUsbDevice {
    pub fn info(&self) -> &AdbDeviceInfo {
        &self.info
    }

    /// Bulk channel over this device's ADB interface, not yet claimed.
    pub fn into_channel(self) -> RusbChannel {
        RusbChannel::new(self.device, self.info.interface)
    }
}

impl AsRef<AdbDeviceInfo> for AdbUsbDevice {
    fn as_ref(&self) -> &AdbDeviceInfo {
        &self.info
    }
}

/// Enumerate every USB device exposing an ADB interface.
///
/// With `restrict_to_known_vendors`, devices whose vendor id is not in
/// [`USB_VENDOR_IDS`](super::USB_VENDOR_IDS) are skipped.
pub fn search_adb_devices(restrict_to_known_vendors: bool) -> Result<Vec<AdbUsbDevice>> {
    let mut found = Vec::new();

    for device in rusb::devices()?.iter() {
        let Ok(descriptor) = device.device_descriptor() else {
            continue;
        };
        if restrict_to_known_vendors && !is_known_vendor(descriptor.vendor_id()) {
            continue;
        }
        let Some(interface) = find_adb_interface(&device, &descriptor) else {
            continue;
        };

        let info = AdbDeviceInfo::from_usb_device(&device, &descriptor, interface);
        log::debug!(
            "found adb device {:04x}:{:04x} on bus {} address {} (serial {:?})",
            info.vendor_id,
            info.product_id,
            info.bus,
            info.address,
            info.serial
        );
        found.push(AdbUsbDevice { device, info });
    }

    Ok(found)
}

/// Pick the device whose serial number is `serial`.
pub fn select_by_serial<D: AsRef<AdbDeviceInfo>>(devices: Vec<D>, serial: &str) -> Result<D> {
    devices
        .into_iter()
        .find(|d| d.as_ref().serial.as_deref() == Some(serial))
        .ok_or(ADBError::DeviceNotFound)
}

/// Enumerate devices and pick the one whose serial number is `serial`.
pub fn find_by_serial(serial: &str, restrict_to_known_vendors: bool) -> Result<AdbUsbDevice> {
    select_by_serial(search_adb_devices(restrict_to_known_vendors)?, serial)
}
