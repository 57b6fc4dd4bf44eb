use super::{SYNC_SERVICE, end_sync, sync_stat};
use crate::device::ADBMessageDevice;
use crate::device::models::AdbStatResponse;
use crate::{ADBMessageTransport, Result};

impl<T: ADBMessageTransport> ADBMessageDevice<T> {
    pub(crate) fn stat_path(&mut self, remote_path: &str) -> Result<AdbStatResponse> {
        self.with_stream(SYNC_SERVICE, |session| {
            let stat = sync_stat(session, remote_path)?;
            end_sync(session)?;
            Ok(stat)
        })
    }
}
