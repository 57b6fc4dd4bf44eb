use std::fmt::Debug;

use super::models::{ADBRsaKey, TokenSigner};
use crate::Result;
use crate::config::KeyPaths;

/// What the handshake needs to authenticate: a signer for the device token and
/// the public key to offer when the signature is refused.
pub struct AuthCredentials {
    signer: Box<dyn TokenSigner>,
    public_key: Vec<u8>,
}

impl AuthCredentials {
    pub fn new(signer: impl TokenSigner + 'static, public_key: impl Into<Vec<u8>>) -> Self {
        Self {
            signer: Box::new(signer),
            public_key: public_key.into(),
        }
    }

    /// Load the private key and the public key file.
    pub fn from_paths(paths: &KeyPaths) -> Result<Self> {
        let signer = ADBRsaKey::from_path(&paths.private_key)?;
        let public_key = std::fs::read(&paths.public_key)?;
        log::debug!(
            "loaded adb keys from {} and {}",
            paths.private_key.display(),
            paths.public_key.display()
        );
        Ok(Self::new(signer, public_key))
    }

    pub fn from_default_paths() -> Result<Self> {
        Self::from_paths(&KeyPaths::default_paths()?)
    }

    pub(crate) fn sign(&self, token: &[u8]) -> Result<Vec<u8>> {
        self.signer.sign(token)
    }

    /// Public key as sent in AUTH(RSAPUBLICKEY): the key file contents, NUL terminated.
    pub fn public_key_payload(&self) -> Vec<u8> {
        let mut payload = self.public_key.clone();
        if payload.last() != Some(&0) {
            payload.push(0);
        }
        payload
    }
}

impl Debug for AuthCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthCredentials")
            .field("public_key_len", &self.public_key.len())
            .finish_non_exhaustive()
    }
}
