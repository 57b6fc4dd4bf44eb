use chrono::{DateTime, Utc};
use std::fs::{File, Metadata};
use std::io::{ErrorKind, Read};
use std::path::Path;

use super::{SYNC_SERVICE, end_sync, sync_request, sync_stat};
use crate::device::{ADBMessageDevice, StreamSession};
use crate::device::models::{CommandOutput, MessageSubcommand};
use crate::device::sync_framing::{SendFramer, parse_sync_status};
use crate::{ADBError, ADBMessageTransport, Result};

/// Join a device directory and a file name.
pub(crate) fn remote_file_path(dest_dir: &str, filename: &str) -> String {
    if dest_dir.ends_with('/') {
        format!("{dest_dir}{filename}")
    } else {
        format!("{dest_dir}/{filename}")
    }
}

fn parent_dir(remote_path: &str) -> &str {
    match remote_path.rsplit_once('/') {
        Some(("", _)) => "/",
        Some((dir, _)) => dir,
        None => ".",
    }
}

#[cfg(unix)]
fn local_mode(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode()
}

#[cfg(not(unix))]
fn local_mode(_metadata: &Metadata) -> u32 {
    crate::constants::DEFAULT_PUSH_MODE
}

fn local_mtime(metadata: &Metadata) -> u32 {
    metadata
        .modified()
        .ok()
        .map(|time| DateTime::<Utc>::from(time).timestamp())
        .and_then(|seconds| u32::try_from(seconds).ok())
        .unwrap_or_default()
}

/// Send every framed packet, then read the device's verdict on the file.
fn send_file<T: ADBMessageTransport, R: Read>(
    session: &mut StreamSession<'_, T>,
    mut framer: SendFramer<R>,
) -> Result<usize> {
    let mut packets = 0;
    while let Some(packet) = framer.next_packet()? {
        session.send_and_expect_okay(&packet)?;
        packets += 1;
    }
    let status = session.recv_write()?;
    parse_sync_status(status.payload())?;
    Ok(packets)
}

impl<T: ADBMessageTransport> ADBMessageDevice<T> {
    /// Stream `reader` to `remote_path` over a `sync:` stream.
    pub(crate) fn push_stream<R: Read>(
        &mut self,
        reader: R,
        remote_path: &str,
        mode: u32,
        mtime: u32,
    ) -> Result<()> {
        self.with_stream(SYNC_SERVICE, |session| {
            let dest_dir = parent_dir(remote_path);
            let stat = sync_stat(session, dest_dir)?;
            log::debug!("push destination {dest_dir} exists: {}", stat.exists());

            let header = format!("{remote_path},{mode}");
            sync_request(session, MessageSubcommand::Send, header.as_bytes())?;

            let packets = send_file(session, SendFramer::new(reader, mtime))?;
            log::debug!("pushed {remote_path} in {packets} packets");
            end_sync(session)
        })
    }

    /// Push a local file into the device directory `dest_dir`, keeping its
    /// name, mode and modification time.
    pub(crate) fn push_path(&mut self, source: &Path, dest_dir: &str) -> Result<CommandOutput> {
        let metadata = match std::fs::metadata(source) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::warn!("push source {} does not exist", source.display());
                return Ok(CommandOutput::FileNotFound(source.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        if !metadata.is_file() {
            return Err(ADBError::IOError(std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("{} is not a regular file", source.display()),
            )));
        }
        let filename = source
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                ADBError::IOError(std::io::Error::new(
                    ErrorKind::InvalidInput,
                    format!("{} has no usable file name", source.display()),
                ))
            })?;

        let remote_path = remote_file_path(dest_dir, filename);
        let file = File::open(source)?;
        self.push_stream(file, &remote_path, local_mode(&metadata), local_mtime(&metadata))?;
        log::info!(
            "pushed {} ({} bytes) to {remote_path}",
            source.display(),
            metadata.len()
        );
        Ok(CommandOutput::Done)
    }
}
