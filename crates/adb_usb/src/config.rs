use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    ADB_KEY_DIR, ADB_PRIVATE_KEY, ADB_PUBLIC_KEY, CONNECT_MAXDATA, CONNECT_PAYLOAD,
    DEFAULT_AUTH_TIMEOUT, DEFAULT_LOCAL_ID, DEFAULT_MAX_CONNECT_ATTEMPTS,
    DEFAULT_TRANSFER_TIMEOUT,
};
use crate::{ADBError, Result};

/// Tunables of one device connection.
///
/// Defaults match what stock devices expect; every field can be overridden
/// through the `with_*` methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Timeout applied to each individual bulk transfer.
    pub transfer_timeout: Duration,
    /// Timeout applied while waiting for the device to accept our public key.
    pub auth_timeout: Duration,
    /// Full connect-loop iterations before giving up.
    pub max_connect_attempts: u32,
    /// Local id used when opening streams.
    pub local_id: u32,
    /// Max payload advertised in CNXN, also the size of each payload read.
    pub max_payload: u32,
    /// Host banner sent in CNXN.
    pub host_banner: String,
    /// Only consider devices whose vendor id is in the known vendor table.
    pub restrict_to_known_vendors: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            transfer_timeout: DEFAULT_TRANSFER_TIMEOUT,
            auth_timeout: DEFAULT_AUTH_TIMEOUT,
            max_connect_attempts: DEFAULT_MAX_CONNECT_ATTEMPTS,
            local_id: DEFAULT_LOCAL_ID,
            max_payload: CONNECT_MAXDATA,
            host_banner: CONNECT_PAYLOAD.to_string(),
            restrict_to_known_vendors: true,
        }
    }
}

impl ConnectionConfig {
    pub fn with_transfer_timeout(mut self, timeout: Duration) -> Self {
        self.transfer_timeout = timeout;
        self
    }

    pub fn with_auth_timeout(mut self, timeout: Duration) -> Self {
        self.auth_timeout = timeout;
        self
    }

    /// A value of zero is treated as one attempt.
    pub fn with_max_connect_attempts(mut self, attempts: u32) -> Self {
        self.max_connect_attempts = attempts.max(1);
        self
    }

    pub fn with_local_id(mut self, local_id: u32) -> Self {
        self.local_id = local_id;
        self
    }

    pub fn with_max_payload(mut self, max_payload: u32) -> Self {
        self.max_payload = max_payload;
        self
    }

    pub fn with_host_banner(mut self, banner: impl Into<String>) -> Self {
        self.host_banner = banner.into();
        self
    }

    pub fn with_any_vendor(mut self) -> Self {
        self.restrict_to_known_vendors = false;
        self
    }
}

/// Location of the adb key pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPaths {
    pub private_key: PathBuf,
    pub public_key: PathBuf,
}

impl KeyPaths {
    pub fn new(private_key: impl Into<PathBuf>, public_key: impl Into<PathBuf>) -> Self {
        Self {
            private_key: private_key.into(),
            public_key: public_key.into(),
        }
    }

    /// `~/.android/adbkey` and `~/.android/adbkey.pub`, the pair the official
    /// adb server generates.
    pub fn default_paths() -> Result<Self> {
        let dir = homedir::my_home()
            .ok()
            .flatten()
            .map(|home| home.join(ADB_KEY_DIR))
            .ok_or(ADBError::NoHomeDirectory)?;

        Ok(Self::new(dir.join(ADB_PRIVATE_KEY), dir.join(ADB_PUBLIC_KEY)))
    }
}
