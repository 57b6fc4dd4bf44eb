#![allow(dead_code)]

use adb_usb::{
    ADBError, ADBMessageDevice, ADBMessageTransport, ADBTransport, ADBTransportMessage,
    AuthCredentials, ConnectionConfig, MessageCommand, MessageSubcommand, Result, SendFramer,
    TokenSigner,
};
use std::collections::VecDeque;
use std::io::Cursor;
use std::time::Duration;

pub const LOCAL_ID: u32 = 12345;
pub const REMOTE_ID: u32 = 7;
pub const DEVICE_BANNER: &str = "device::ro.product.name=sdk_gphone64;ro.product.model=Pixel";

/// What the scripted device does when the host reads.
#[derive(Debug)]
pub enum Reply {
    Message(ADBTransportMessage),
    Timeout,
}

/// In-memory transport replaying device replies and recording host packets.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    pub replies: VecDeque<Reply>,
    pub sent: Vec<ADBTransportMessage>,
    pub read_timeouts: Vec<Duration>,
    pub connects: usize,
    pub disconnects: usize,
}

impl ScriptedTransport {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: replies.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn sent_commands(&self) -> Vec<MessageCommand> {
        self.sent.iter().map(|m| m.header().command()).collect()
    }

    pub fn count_sent(&self, command: MessageCommand) -> usize {
        self.sent
            .iter()
            .filter(|m| m.header().command() == command)
            .count()
    }

    /// Payloads of every WRTE the host sent, in order.
    pub fn sent_writes(&self) -> Vec<Vec<u8>> {
        self.sent
            .iter()
            .filter(|m| m.header().command() == MessageCommand::Write)
            .map(|m| m.payload().to_vec())
            .collect()
    }
}

impl ADBTransport for ScriptedTransport {
    fn connect(&mut self) -> Result<()> {
        self.connects += 1;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        self.disconnects += 1;
        Ok(())
    }
}

impl ADBMessageTransport for ScriptedTransport {
    fn read_message_with_timeout(&mut self, read_timeout: Duration) -> Result<ADBTransportMessage> {
        self.read_timeouts.push(read_timeout);
        match self.replies.pop_front() {
            Some(Reply::Message(message)) => Ok(message),
            // a silent device looks like a timeout
            Some(Reply::Timeout) | None => Err(ADBError::Timeout),
        }
    }

    fn write_message_with_timeout(
        &mut self,
        message: ADBTransportMessage,
        _write_timeout: Duration,
    ) -> Result<()> {
        self.sent.push(message);
        Ok(())
    }
}

/// Signer that reverses the token, so tests can check what was signed.
#[derive(Debug)]
pub struct ReversingSigner;

impl TokenSigner for ReversingSigner {
    fn sign(&self, token: &[u8]) -> Result<Vec<u8>> {
        Ok(token.iter().rev().copied().collect())
    }
}

pub const PUBLIC_KEY: &[u8] = b"QAAAAK7vXh1Q test@host";

pub fn credentials() -> AuthCredentials {
    AuthCredentials::new(ReversingSigner, PUBLIC_KEY.to_vec())
}

pub fn device(replies: impl IntoIterator<Item = Reply>) -> ADBMessageDevice<ScriptedTransport> {
    device_with_config(replies, ConnectionConfig::default())
}

pub fn device_with_config(
    replies: impl IntoIterator<Item = Reply>,
    config: ConnectionConfig,
) -> ADBMessageDevice<ScriptedTransport> {
    ADBMessageDevice::new(ScriptedTransport::new(replies), credentials(), config)
}

/// A device that answers CNXN directly, already connected. `replies` follow
/// the handshake.
pub fn connected_device(replies: Vec<Reply>) -> ADBMessageDevice<ScriptedTransport> {
    let mut script = vec![cnxn()];
    script.extend(replies);
    let mut device = device(script);
    device.connect().expect("scripted handshake");
    device
}

fn message(command: MessageCommand, arg0: u32, arg1: u32, payload: &[u8]) -> Reply {
    Reply::Message(ADBTransportMessage::new(command, arg0, arg1, payload))
}

pub fn cnxn() -> Reply {
    let mut banner = DEVICE_BANNER.as_bytes().to_vec();
    banner.push(0);
    message(MessageCommand::Cnxn, 0x0100_0000, 256 * 1024, &banner)
}

pub fn auth_token(token: &[u8]) -> Reply {
    message(MessageCommand::Auth, adb_usb::AUTH_TOKEN, 0, token)
}

pub fn okay() -> Reply {
    message(MessageCommand::Okay, REMOTE_ID, LOCAL_ID, &[])
}

pub fn okays(count: usize) -> Vec<Reply> {
    (0..count).map(|_| okay()).collect()
}

pub fn wrte(payload: &[u8]) -> Reply {
    message(MessageCommand::Write, REMOTE_ID, LOCAL_ID, payload)
}

pub fn clse() -> Reply {
    message(MessageCommand::Clse, REMOTE_ID, LOCAL_ID, &[])
}

pub fn sync_word(subcommand: MessageSubcommand, arg: u32) -> Vec<u8> {
    let mut bytes = (subcommand as u32).to_le_bytes().to_vec();
    bytes.extend_from_slice(&arg.to_le_bytes());
    bytes
}

pub fn stat_payload(mode: u32, size: u32, mtime: u32) -> Vec<u8> {
    let mut payload = b"STAT".to_vec();
    for word in [mode, size, mtime] {
        payload.extend_from_slice(&word.to_le_bytes());
    }
    payload
}

/// OPEN accepted on `sync:`, then a STAT request answered with `mode`.
pub fn sync_open_and_stat(mode: u32, size: u32) -> Vec<Reply> {
    let mut replies = vec![okay()];
    replies.extend(okays(2));
    replies.push(wrte(&stat_payload(mode, size, 1_700_000_000)));
    replies
}

/// QUIT acknowledged, then the close handshake.
pub fn sync_quit_and_close() -> Vec<Reply> {
    vec![okay(), clse()]
}

/// Number of WRTE packets a push of `content` takes.
pub fn push_packet_count(content: &[u8]) -> usize {
    let mut framer = SendFramer::new(Cursor::new(content.to_vec()), 0);
    let mut count = 0;
    while framer.next_packet().expect("in-memory read").is_some() {
        count += 1;
    }
    count
}

pub fn dent(mode: u32, size: u32, mtime: u32, name: &str) -> Vec<u8> {
    let mut record = sync_word(MessageSubcommand::Dent, mode);
    for word in [size, mtime, name.len() as u32] {
        record.extend_from_slice(&word.to_le_bytes());
    }
    record.extend_from_slice(name.as_bytes());
    record
}

pub fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("adb_usb_{}_{name}", std::process::id()))
}
