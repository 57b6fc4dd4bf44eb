use super::{SYNC_SERVICE, end_sync, sync_request, sync_stat};
use crate::device::models::{DirEntry, MessageSubcommand};
use crate::device::sync_framing::ListDecoder;
use crate::device::{ADBMessageDevice, StreamSession};
use crate::{ADBMessageTransport, Result};

fn recv_listing<T: ADBMessageTransport>(
    session: &mut StreamSession<'_, T>,
    remote_path: &str,
) -> Result<Vec<DirEntry>> {
    sync_request(session, MessageSubcommand::List, remote_path.as_bytes())?;
    let mut decoder = ListDecoder::new();
    while !decoder.is_done() {
        let message = session.recv_write()?;
        decoder.feed(message.payload())?;
    }
    Ok(decoder.into_entries())
}

impl<T: ADBMessageTransport> ADBMessageDevice<T> {
    /// Entries of `remote_path` in the order the device sent them.
    ///
    /// `None` when the path does not exist; a plain file lists as empty.
    pub(crate) fn list_dir(&mut self, remote_path: &str) -> Result<Option<Vec<DirEntry>>> {
        self.with_stream(SYNC_SERVICE, |session| {
            let stat = sync_stat(session, remote_path)?;
            if !stat.exists() || !stat.is_directory() {
                log::debug!("{remote_path} is not a directory (mode {:o})", stat.mode);
                session.close()?;
                return Ok(stat.exists().then(Vec::new));
            }

            let entries = recv_listing(session, remote_path)?;
            end_sync(session)?;
            Ok(Some(entries))
        })
    }
}
