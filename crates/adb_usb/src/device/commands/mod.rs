mod install;
mod list;
mod pull;
mod push;
mod reboot;
mod shell;
mod stat;
mod uninstall;

use super::StreamSession;
use super::models::{AdbStatResponse, MessageSubcommand};
use super::sync_framing::{parse_stat_response, sync_header};
use crate::{ADBMessageTransport, Result};

pub(crate) const SYNC_SERVICE: &str = "sync:";

/// Send a sync request as two acknowledged writes: the 8-byte header, then the path.
fn sync_request<T: ADBMessageTransport>(
    session: &mut StreamSession<'_, T>,
    subcommand: MessageSubcommand,
    path: &[u8],
) -> Result<()> {
    session.send_and_expect_okay(&sync_header(subcommand, u32::try_from(path.len())?)?)?;
    session.send_and_expect_okay(path)?;
    Ok(())
}

fn sync_stat<T: ADBMessageTransport>(
    session: &mut StreamSession<'_, T>,
    remote_path: &str,
) -> Result<AdbStatResponse> {
    sync_request(session, MessageSubcommand::Stat, remote_path.as_bytes())?;
    let response = session.recv_write()?;
    parse_stat_response(response.payload())
}

/// QUIT the sync service, then close the stream.
fn end_sync<T: ADBMessageTransport>(session: &mut StreamSession<'_, T>) -> Result<()> {
    session.send_and_expect_okay(&sync_header(MessageSubcommand::Quit, 0)?)?;
    session.close()
}
