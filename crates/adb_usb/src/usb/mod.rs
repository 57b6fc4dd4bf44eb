mod discovery;
mod usb_vendors;

pub use discovery::{
    ADB_CLASS, ADB_PROTOCOL, ADB_SUBCLASS, AdbDeviceInfo, AdbInterface, AdbUsbDevice,
    EndpointSummary, InterfaceSummary, find_adb_interface, find_by_serial, is_adb_device,
    match_adb_interface, search_adb_devices, select_by_serial,
};
pub use usb_vendors::{USB_VENDOR_IDS, is_known_vendor};
