use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::{Pkcs1v15Sign, RsaPrivateKey};
use sha1::Sha1;
use std::fmt::Debug;
use std::path::Path;

use crate::Result;

/// Signs the random token a device sends in its AUTH challenge.
pub trait TokenSigner: Send {
    fn sign(&self, token: &[u8]) -> Result<Vec<u8>>;
}

/// RSA private key as stored in `~/.android/adbkey`.
///
/// The device token is treated as an already computed SHA-1 digest and signed
/// with PKCS#1 v1.5 padding, which is what adbd verifies against.
pub struct ADBRsaKey {
    private_key: RsaPrivateKey,
}

impl ADBRsaKey {
    /// Parse a PEM key, PKCS#8 first then PKCS#1.
    pub fn from_pem(pem: &str) -> Result<Self> {
        let private_key = match RsaPrivateKey::from_pkcs8_pem(pem) {
            Ok(key) => key,
            Err(pkcs8_error) => {
                log::debug!("key is not PKCS#8 ({pkcs8_error}), trying PKCS#1");
                RsaPrivateKey::from_pkcs1_pem(pem)?
            }
        };
        Ok(Self { private_key })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let pem = std::fs::read_to_string(path.as_ref())?;
        Self::from_pem(&pem)
    }
}

impl TokenSigner for ADBRsaKey {
    fn sign(&self, token: &[u8]) -> Result<Vec<u8>> {
        Ok(self
            .private_key
            .sign(Pkcs1v15Sign::new::<Sha1>(), token)?)
    }
}

impl Debug for ADBRsaKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ADBRsaKey").finish_non_exhaustive()
    }
}
