use std::path::Path;

use crate::constants::INSTALL_STAGING_DIR;
use crate::device::ADBMessageDevice;
use crate::device::models::CommandOutput;
use crate::{ADBMessageTransport, Result};

impl<T: ADBMessageTransport> ADBMessageDevice<T> {
    /// Stage the APK in `/data/local/tmp/` and hand it to the package manager.
    pub(crate) fn install_path(&mut self, apk_path: &Path) -> Result<CommandOutput> {
        let staged = self.push_path(apk_path, INSTALL_STAGING_DIR)?;
        if staged.is_file_not_found() {
            return Ok(staged);
        }

        // push_path rejected paths without a file name
        let filename = apk_path
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();
        let output = self.run_shell(&format!("pm install {INSTALL_STAGING_DIR}{filename}"))?;
        let output = String::from_utf8_lossy(&output).trim_end().to_string();
        log::info!("install {}: {output}", apk_path.display());
        Ok(CommandOutput::Installed(output))
    }
}
