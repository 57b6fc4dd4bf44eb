#![forbid(unsafe_code)]
#![forbid(missing_debug_implementations)]
#![doc = include_str!("../README.md")]

mod config;
mod constants;
mod device;
mod error;
mod transports;
pub mod usb;

pub use config::{ConnectionConfig, KeyPaths};
pub use constants::{
    CONNECT_MAXDATA, CONNECT_PAYLOAD, CONNECT_VERSION, DEFAULT_LOCAL_ID, SYNC_DATA_MAX,
    SYNC_PACKET_CAP,
};
pub use device::{
    ADBCommand, ADBDeviceExt, ADBMessageDevice, ADBRsaKey, ADBTransportMessage,
    ADBTransportMessageHeader, ADBUSBDevice, AUTH_RSAPUBLICKEY, AUTH_SIGNATURE, AUTH_TOKEN,
    AdbStatResponse, AuthCredentials, CommandOutput, ConnectionEvent, ConnectionState, DirEntry,
    ListDecoder, MessageCommand, MessageSubcommand, SendFramer, StreamSession,
    SubcommandWithArg, SyncDataDecoder, TokenSigner, decode_message, encode_message,
    strip_sync_framing,
};
pub use error::{ADBError, Result};
pub use transports::{ADBMessageTransport, ADBTransport, BulkChannel, RusbChannel, USBTransport};
