use bincode::config::{Configuration, Fixint, LittleEndian, NoLimit};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::Write;

use super::adb_transport_message::{AUTH_RSAPUBLICKEY, AUTH_SIGNATURE, AUTH_TOKEN};
use super::connection_state::{ConnectionEvent, ConnectionState};
use super::models::{ADBCommand, CommandOutput};
use super::{ADBTransportMessage, AuthCredentials, MessageCommand, StreamSession};
use crate::config::ConnectionConfig;
use crate::constants::CONNECT_VERSION;
use crate::{ADBError, ADBMessageTransport, Result};

const BINCODE_CONFIG: Configuration<LittleEndian, Fixint, NoLimit> = bincode::config::legacy();

pub(crate) fn bincode_serialize_to_vec<E: Serialize>(val: E) -> Result<Vec<u8>> {
    bincode::serde::encode_to_vec(val, BINCODE_CONFIG).map_err(|_e| ADBError::ConversionError)
}

pub(crate) fn bincode_deserialize_from_slice<D: DeserializeOwned>(data: &[u8]) -> Result<D> {
    let (response, _) = bincode::serde::decode_from_slice(data, BINCODE_CONFIG)
        .map_err(|_e| ADBError::ConversionError)?;

    Ok(response)
}

/// Generic structure representing an ADB device reachable over an [`ADBMessageTransport`].
/// Structure is totally agnostic over which transport is truly used.
///
/// It drives the CNXN/AUTH handshake, then runs one command at a time, each on
/// its own stream.
#[derive(Debug)]
pub struct ADBMessageDevice<T: ADBMessageTransport> {
    transport: T,
    config: ConnectionConfig,
    credentials: AuthCredentials,
    state: ConnectionState,
    banner: Option<String>,
}

/// How one pass of the connect loop ended.
enum Attempt {
    Connected,
    Restart,
}

impl<T: ADBMessageTransport> ADBMessageDevice<T> {
    /// Instantiate a new [`ADBMessageDevice`]; nothing is sent until [`connect`](Self::connect).
    pub fn new(transport: T, credentials: AuthCredentials, config: ConnectionConfig) -> Self {
        Self {
            transport,
            config,
            credentials,
            state: ConnectionState::NotConnected,
            banner: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// System identity the device sent in its CNXN, once connected.
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn apply(&mut self, event: ConnectionEvent) -> Result<()> {
        self.state = self.state.transition(event)?;
        Ok(())
    }

    /// Claim the device and authenticate.
    ///
    /// Timeouts and refused keys restart the handshake from CNXN, at most
    /// `max_connect_attempts` times. Any other failure releases the device.
    pub fn connect(&mut self) -> Result<()> {
        if self.state.is_connected() {
            return Ok(());
        }

        let attempts = self.config.max_connect_attempts;
        for attempt in 1..=attempts {
            match self.connect_attempt() {
                Ok(Attempt::Connected) => return Ok(()),
                Ok(Attempt::Restart) => {
                    log::info!("device did not accept our key, retrying ({attempt}/{attempts})");
                }
                Err(ADBError::Timeout) => {
                    log::info!("handshake timed out, retrying ({attempt}/{attempts})");
                    self.apply(ConnectionEvent::Timeout)?;
                }
                Err(e) => {
                    self.release();
                    return Err(e);
                }
            }
        }

        self.release();
        Err(ADBError::ConnectionAttemptsExhausted(attempts))
    }

    fn connect_attempt(&mut self) -> Result<Attempt> {
        self.transport.connect()?;

        let mut banner = self.config.host_banner.as_bytes().to_vec();
        banner.push(b'\0');
        self.transport.write_message(ADBTransportMessage::new(
            MessageCommand::Cnxn,
            CONNECT_VERSION,
            self.config.max_payload,
            &banner,
        ))?;
        self.apply(ConnectionEvent::CnxnSent)?;

        let message = self.transport.read_message()?;
        match message.header().command() {
            MessageCommand::Cnxn => {
                self.apply(ConnectionEvent::CnxnReceived)?;
                self.on_connected(message)?;
                return Ok(Attempt::Connected);
            }
            MessageCommand::Auth if message.header().arg0() == AUTH_TOKEN => {
                log::debug!("Authentication challenge received (token)");
                self.apply(ConnectionEvent::AuthRequested)?;
            }
            other => {
                return Err(ADBError::ProtocolViolation(format!(
                    "expected AUTH or CNXN after CNXN, got {other}"
                )));
            }
        }

        let signature = self.credentials.sign(message.payload())?;
        self.transport.write_message(ADBTransportMessage::new(
            MessageCommand::Auth,
            AUTH_SIGNATURE,
            0,
            &signature,
        ))?;

        let message = self.transport.read_message()?;
        if message.header().command() == MessageCommand::Cnxn {
            self.apply(ConnectionEvent::TokenAccepted)?;
            self.on_connected(message)?;
            return Ok(Attempt::Connected);
        }
        log::debug!(
            "signed token refused ({}), sending RSA public key",
            message.header().command()
        );
        self.apply(ConnectionEvent::TokenRefused)?;

        self.transport.write_message(ADBTransportMessage::new(
            MessageCommand::Auth,
            AUTH_RSAPUBLICKEY,
            0,
            &self.credentials.public_key_payload(),
        ))?;

        // the user may have to confirm the key on the device
        let message = self
            .transport
            .read_message_with_timeout(self.config.auth_timeout)?;
        if message.header().command() == MessageCommand::Cnxn {
            self.apply(ConnectionEvent::PublicKeyAccepted)?;
            self.on_connected(message)?;
            return Ok(Attempt::Connected);
        }

        log::debug!("public key refused ({})", message.header().command());
        self.apply(ConnectionEvent::PublicKeyRefused)?;
        Ok(Attempt::Restart)
    }

    fn on_connected(&mut self, message: ADBTransportMessage) -> Result<()> {
        let max_payload = message.header().arg1();
        let mut payload = message.into_payload();
        if let Some(end) = payload.iter().position(|&b| b == 0) {
            payload.truncate(end);
        }
        let banner = String::from_utf8(payload)?;
        log::info!("Authentication OK, device info {banner} (max payload {max_payload})");
        self.banner = Some(banner);
        Ok(())
    }

    /// Release the device, whatever the current state.
    fn release(&mut self) {
        if let Err(e) = self.transport.disconnect() {
            log::warn!("failed to release device: {e}");
        }
        self.state = ConnectionState::NotConnected;
        self.banner = None;
    }

    pub(crate) fn ensure_connected(&self) -> Result<()> {
        if self.state.is_connected() {
            Ok(())
        } else {
            Err(ADBError::NotConnected(self.state))
        }
    }

    /// Release the device after a successful [`connect`](Self::connect).
    pub fn close_connection(&mut self) -> Result<()> {
        self.ensure_connected()?;
        let result = self.transport.disconnect();
        self.state = self.state.transition(ConnectionEvent::Closed)?;
        self.banner = None;
        result
    }

    /// Open a stream on `destination` and run `body` on it.
    ///
    /// A failure inside `body` closes the stream before the error is returned;
    /// a timeout only gets a best-effort CLSE. Errors that leave the link in an
    /// unknown state release the device.
    pub(crate) fn with_stream<R>(
        &mut self,
        destination: &str,
        body: impl FnOnce(&mut StreamSession<'_, T>) -> Result<R>,
    ) -> Result<R> {
        self.ensure_connected()?;
        let local_id = self.config.local_id;
        let mut link_lost = false;

        let result = StreamSession::open(&mut self.transport, local_id, destination).and_then(
            |mut session| {
                body(&mut session).inspect_err(|e| {
                    if let Err(close_error) = session.close_after_failure(e) {
                        log::warn!("could not close {destination} after failure: {close_error}");
                        link_lost = close_error.is_transport_fatal();
                    }
                })
            },
        );

        if let Err(e) = &result {
            if link_lost || e.is_transport_fatal() {
                log::warn!("transport failure on {destination}, releasing device: {e}");
                self.release();
            }
        }
        result
    }

    /// Run one command on a connected device.
    pub fn run_command(&mut self, command: ADBCommand) -> Result<CommandOutput> {
        self.ensure_connected()?;
        log::debug!("running {command:?}");

        match command {
            ADBCommand::Shell { command, print } => {
                let output = String::from_utf8_lossy(&self.run_shell(&command)?).into_owned();
                if print {
                    let mut stdout = std::io::stdout();
                    stdout.write_all(output.as_bytes())?;
                    stdout.flush()?;
                }
                Ok(CommandOutput::Shell(output))
            }
            ADBCommand::Push {
                source,
                destination,
            } => self.push_path(&source, &destination),
            ADBCommand::Pull {
                source,
                destination,
            } => self.pull_to_path(&source, &destination),
            ADBCommand::List { remote_path } => Ok(match self.list_dir(&remote_path)? {
                Some(entries) => CommandOutput::Listing(entries),
                None => CommandOutput::FileNotFound(remote_path),
            }),
            ADBCommand::Install { source } => self.install_path(&source),
            ADBCommand::Uninstall { package_name } => {
                Ok(CommandOutput::Uninstalled(self.uninstall_package(&package_name)?))
            }
            ADBCommand::Reboot => {
                self.reboot_device()?;
                Ok(CommandOutput::Done)
            }
        }
    }

    /// Called once the device was told to reboot: it drops off the bus.
    pub(crate) fn on_reboot(&mut self) {
        self.release();
    }
}
