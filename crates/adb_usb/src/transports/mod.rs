mod rusb_channel;
mod traits;
mod usb_transport;

pub use rusb_channel::RusbChannel;
pub use traits::{ADBMessageTransport, ADBTransport, BulkChannel};
pub use usb_transport::USBTransport;
