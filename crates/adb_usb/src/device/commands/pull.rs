use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::{SYNC_SERVICE, end_sync, sync_request, sync_stat};
use crate::device::models::{CommandOutput, MessageSubcommand};
use crate::device::sync_framing::SyncDataDecoder;
use crate::device::{ADBMessageDevice, StreamSession};
use crate::{ADBMessageTransport, Result};

/// Feed RECV payloads to `output` until the device sends DONE.
fn recv_file<T: ADBMessageTransport, W: Write>(
    session: &mut StreamSession<'_, T>,
    output: &mut W,
) -> Result<u64> {
    let mut decoder = SyncDataDecoder::new();
    let mut received = 0;
    while !decoder.is_done() {
        let message = session.recv_write()?;
        received += decoder.feed(message.payload(), output)?;
    }
    output.flush()?;
    Ok(received)
}

impl<T: ADBMessageTransport> ADBMessageDevice<T> {
    /// Copy `remote_path` into the writer returned by `open`.
    ///
    /// `open` only runs once the device confirmed the file exists; a missing
    /// file yields `None` and no RECV is sent.
    pub(crate) fn pull_with<W: Write>(
        &mut self,
        remote_path: &str,
        open: impl FnOnce() -> Result<W>,
    ) -> Result<Option<u64>> {
        self.with_stream(SYNC_SERVICE, |session| {
            let stat = sync_stat(session, remote_path)?;
            if !stat.exists() {
                log::debug!("pull source {remote_path} does not exist");
                session.close()?;
                return Ok(None);
            }

            let mut output = open()?;
            sync_request(session, MessageSubcommand::Recv, remote_path.as_bytes())?;
            let received = recv_file(session, &mut output)?;
            end_sync(session)?;

            if u64::from(stat.size) != received {
                log::debug!(
                    "{remote_path}: stat announced {} bytes, received {received}",
                    stat.size
                );
            }
            Ok(Some(received))
        })
    }

    pub(crate) fn pull_to_path(
        &mut self,
        source: &str,
        destination: &Path,
    ) -> Result<CommandOutput> {
        let pulled = self.pull_with(source, || Ok(BufWriter::new(File::create(destination)?)))?;
        Ok(match pulled {
            Some(size) => {
                log::info!("pulled {source} ({size} bytes) to {}", destination.display());
                CommandOutput::Pulled(size)
            }
            None => CommandOutput::FileNotFound(source.to_string()),
        })
    }
}
