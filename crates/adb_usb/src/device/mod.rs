mod adb_device_ext;
mod adb_message_device;
mod adb_transport_message;
mod adb_usb_device;
mod auth_credentials;
mod commands;
mod connection_state;
mod models;
mod stream_session;
mod sync_framing;

pub use adb_device_ext::ADBDeviceExt;
pub use adb_message_device::ADBMessageDevice;
pub use adb_transport_message::{
    ADBTransportMessage, ADBTransportMessageHeader, AUTH_RSAPUBLICKEY, AUTH_SIGNATURE, AUTH_TOKEN,
    decode_message, encode_message,
};
pub use adb_usb_device::ADBUSBDevice;
pub use auth_credentials::AuthCredentials;
pub use connection_state::{ConnectionEvent, ConnectionState};
pub use models::{
    ADBCommand, ADBRsaKey, AdbStatResponse, CommandOutput, DirEntry, MessageCommand,
    MessageSubcommand, SubcommandWithArg, TokenSigner,
};
pub use stream_session::StreamSession;
pub use sync_framing::{ListDecoder, SendFramer, SyncDataDecoder, strip_sync_framing};
