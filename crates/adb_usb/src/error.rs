use thiserror::Error;

use crate::device::ConnectionState;

/// Custom Result type thrown by this crate.
pub type Result<T> = std::result::Result<T, ADBError>;

/// Represents all errors that can be raised by this crate.
#[derive(Error, Debug)]
pub enum ADBError {
    /// No USB device exposes an ADB interface
    #[error("No ADB device found over USB")]
    DeviceNotFound,
    /// Device handle could not be opened or its interface claimed
    #[error("Device unavailable: {0}")]
    DeviceUnavailable(rusb::Error),
    /// Any other error raised by libusb during a transfer
    #[error(transparent)]
    UsbError(rusb::Error),
    /// A bulk transfer did not complete within the configured timeout
    #[error("USB transfer timed out")]
    Timeout,
    /// Packet opcode is not one of CNXN, AUTH, OPEN, OKAY, WRTE, CLSE
    #[error("Invalid ADB command 0x{0:08x}")]
    InvalidCommand(u32),
    /// Fewer than 24 bytes were supplied to the header decoder
    #[error("Truncated ADB header: got {0} bytes, need 24")]
    TruncatedHeader(usize),
    /// Magic word is not the complement of the command word
    #[error("Invalid magic: computed 0x{0:08x}, got 0x{1:08x}")]
    InvalidMagic(u32, u32),
    /// Payload checksum does not match the header's data_crc field
    #[error("Invalid payload checksum: computed {0}, got {1}")]
    InvalidChecksum(u32, u32),
    /// Device answered with an unexpected command
    #[error("Wrong response command received: {0}. Expected {1}")]
    WrongResponseReceived(String, String),
    /// Device refused to open a stream
    #[error("Stream open rejected for '{0}'")]
    OpenRejected(String),
    /// Device broke the protocol in a way that is not a single wrong command
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),
    /// Device sent a sync FAIL response
    #[error("Sync request failed: {0}")]
    SyncFailure(String),
    /// Operation requires a connected device
    #[error("Device not connected (state: {0})")]
    NotConnected(ConnectionState),
    /// Connection state machine received an event it has no transition for
    #[error("Invalid transition from {0} on {1}")]
    InvalidTransition(ConnectionState, String),
    /// Connect loop hit its attempt limit
    #[error("Could not connect after {0} attempts")]
    ConnectionAttemptsExhausted(u32),
    /// Package name would not be safe to hand to the package manager
    #[error("Invalid package name: {0}")]
    InvalidPackageName(String),
    /// Home directory could not be resolved to locate adb keys
    #[error("Cannot get home directory")]
    NoHomeDirectory,
    /// Private key could not be loaded or used
    #[error("Key error: {0}")]
    KeyError(String),
    /// Indicates that an error occurred with I/O.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    /// Serialization of a fixed-layout structure failed
    #[error("Conversion error")]
    ConversionError,
    /// Device banner or shell output is not valid UTF-8
    #[error(transparent)]
    Utf8StrError(#[from] std::string::FromUtf8Error),
    /// Integer does not fit into a protocol length field
    #[error(transparent)]
    TryFromIntError(#[from] std::num::TryFromIntError),
}

impl ADBError {
    /// Errors after which the USB link can no longer be trusted.
    pub fn is_transport_fatal(&self) -> bool {
        matches!(
            self,
            ADBError::UsbError(_) | ADBError::Timeout | ADBError::DeviceNotFound
        )
    }
}

impl From<rusb::Error> for ADBError {
    fn from(value: rusb::Error) -> Self {
        match value {
            rusb::Error::Timeout => ADBError::Timeout,
            rusb::Error::NoDevice | rusb::Error::NotFound => ADBError::DeviceNotFound,
            other => ADBError::UsbError(other),
        }
    }
}

impl From<rsa::Error> for ADBError {
    fn from(value: rsa::Error) -> Self {
        ADBError::KeyError(value.to_string())
    }
}

impl From<rsa::pkcs8::Error> for ADBError {
    fn from(value: rsa::pkcs8::Error) -> Self {
        ADBError::KeyError(value.to_string())
    }
}

impl From<rsa::pkcs1::Error> for ADBError {
    fn from(value: rsa::pkcs1::Error) -> Self {
        ADBError::KeyError(value.to_string())
    }
}
