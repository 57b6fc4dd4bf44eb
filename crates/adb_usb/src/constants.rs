use std::time::Duration;

/// Protocol version sent in the CNXN packet.
pub const CONNECT_VERSION: u32 = 0x0100_0000;
/// Largest payload this host accepts, advertised in the CNXN packet.
pub const CONNECT_MAXDATA: u32 = 4096;
/// System identity sent in the CNXN payload (a NUL is appended on the wire).
pub const CONNECT_PAYLOAD: &str = "host::";

/// Size of the fixed ADB packet header.
pub const ADB_HEADER_LENGTH: usize = 24;

/// Local stream id used for every stream; only one is ever open at a time.
pub const DEFAULT_LOCAL_ID: u32 = 12345;

pub const DEFAULT_TRANSFER_TIMEOUT: Duration = Duration::from_secs(2);
/// Wait applied to the reply after offering our public key: the user may have to
/// accept the key on the device.
pub const DEFAULT_AUTH_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_CONNECT_ATTEMPTS: u32 = 5;

/// Largest DATA block in a sync SEND stream.
pub const SYNC_DATA_MAX: usize = 64 * 1024;
/// Largest WRTE payload built while pushing, DONE trailer excluded.
pub const SYNC_PACKET_CAP: usize = 4000;
/// Size of a sync sub-command header (`id`, `arg`).
pub const SYNC_HEADER_LENGTH: usize = 8;
/// Size of a LIST record before its file name.
pub const SYNC_DENT_LENGTH: usize = 20;

/// Mode given to pushed files when the local mode is unknown.
pub const DEFAULT_PUSH_MODE: u32 = 0o100644;

/// Directory APKs are staged in before `pm install`.
pub const INSTALL_STAGING_DIR: &str = "/data/local/tmp/";

pub const ADB_KEY_DIR: &str = ".android";
pub const ADB_PRIVATE_KEY: &str = "adbkey";
pub const ADB_PUBLIC_KEY: &str = "adbkey.pub";
