use std::fmt::Display;

use crate::{ADBError, Result};

/// Life-cycle of a device connection, from claim to authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ConnectionState {
    #[default]
    NotConnected = 0,
    /// CNXN sent, waiting for the device's AUTH challenge.
    WaitForAuth = 1,
    /// Signed token sent.
    SendPrivateKey = 2,
    /// Public key offered after the signature was refused.
    SendPublicKey = 3,
    Connected = 4,
}

/// What happened on the wire, as seen by the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEvent {
    CnxnSent,
    /// Device answered CNXN directly: authentication is disabled on it.
    CnxnReceived,
    AuthRequested,
    TokenAccepted,
    TokenRefused,
    PublicKeyAccepted,
    PublicKeyRefused,
    Timeout,
    Closed,
}

impl ConnectionState {
    pub fn transition(self, event: ConnectionEvent) -> Result<ConnectionState> {
        use ConnectionEvent as E;
        use ConnectionState as S;

        let next = match (self, event) {
            (S::NotConnected, E::CnxnSent) => S::WaitForAuth,
            (S::WaitForAuth, E::CnxnReceived) => S::Connected,
            (S::WaitForAuth, E::AuthRequested) => S::SendPrivateKey,
            (S::SendPrivateKey, E::TokenAccepted) => S::Connected,
            (S::SendPrivateKey, E::TokenRefused) => S::SendPublicKey,
            (S::SendPublicKey, E::PublicKeyAccepted) => S::Connected,
            (S::SendPublicKey, E::PublicKeyRefused) => S::NotConnected,
            (S::Connected, E::Timeout) => {
                return Err(ADBError::InvalidTransition(self, format!("{event:?}")));
            }
            (_, E::Timeout) | (_, E::Closed) => S::NotConnected,
            (state, event) => {
                return Err(ADBError::InvalidTransition(state, format!("{event:?}")));
            }
        };

        log::trace!("connection state {self} -> {next} on {event:?}");
        Ok(next)
    }

    pub fn is_connected(self) -> bool {
        self == ConnectionState::Connected
    }
}

impl Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConnectionState::NotConnected => "NOT_CONNECTED",
            ConnectionState::WaitForAuth => "WAIT_FOR_AUTH",
            ConnectionState::SendPrivateKey => "SEND_PRIVATE_KEY",
            ConnectionState::SendPublicKey => "SEND_PUBLIC_KEY",
            ConnectionState::Connected => "CONNECTED",
        };
        write!(f, "{name}")
    }
}
