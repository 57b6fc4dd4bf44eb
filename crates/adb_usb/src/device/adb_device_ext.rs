use std::io::{Read, Write};
use std::path::Path;

use super::ADBMessageDevice;
use super::models::{AdbStatResponse, CommandOutput, DirEntry};
use crate::constants::DEFAULT_PUSH_MODE;
use crate::{ADBError, ADBMessageTransport, Result};

/// Trait representing all features available on a connected ADB device.
pub trait ADBDeviceExt {
    /// Run `command` (arguments joined with spaces) and write its output to `output`.
    fn shell_command(&mut self, command: &[&str], output: &mut dyn Write) -> Result<()>;

    /// Display the stat information for a remote file.
    fn stat(&mut self, remote_path: &str) -> Result<AdbStatResponse>;

    /// Pull the remote file pointed to by `source` into `output`.
    ///
    /// Returns `None` when the file does not exist on the device.
    fn pull(&mut self, source: &dyn AsRef<str>, output: &mut dyn Write) -> Result<Option<u64>>;

    /// Push `stream` to the full remote path `path`, with mode 0644.
    fn push(&mut self, stream: &mut dyn Read, path: &dyn AsRef<str>) -> Result<()>;

    /// List a remote directory. Missing paths and plain files list as empty.
    fn list(&mut self, path: &dyn AsRef<str>) -> Result<Vec<DirEntry>>;

    /// Install an APK; returns the package manager's output.
    fn install(&mut self, apk_path: &dyn AsRef<Path>) -> Result<String>;

    /// Uninstall a package, keeping its data; returns the package manager's output.
    fn uninstall(&mut self, package: &str) -> Result<String>;

    /// Reboot the device. The connection is released afterwards.
    fn reboot(&mut self) -> Result<()>;
}

impl<T: ADBMessageTransport> ADBDeviceExt for ADBMessageDevice<T> {
    fn shell_command(&mut self, command: &[&str], output: &mut dyn Write) -> Result<()> {
        let bytes = self.run_shell(&command.join(" "))?;
        output.write_all(&bytes)?;
        Ok(())
    }

    fn stat(&mut self, remote_path: &str) -> Result<AdbStatResponse> {
        self.stat_path(remote_path)
    }

    fn pull(&mut self, source: &dyn AsRef<str>, output: &mut dyn Write) -> Result<Option<u64>> {
        self.pull_with(source.as_ref(), || Ok(output))
    }

    fn push(&mut self, stream: &mut dyn Read, path: &dyn AsRef<str>) -> Result<()> {
        self.push_stream(stream, path.as_ref(), DEFAULT_PUSH_MODE, 0)
    }

    fn list(&mut self, path: &dyn AsRef<str>) -> Result<Vec<DirEntry>> {
        Ok(self.list_dir(path.as_ref())?.unwrap_or_default())
    }

    fn install(&mut self, apk_path: &dyn AsRef<Path>) -> Result<String> {
        let apk_path = apk_path.as_ref();
        match self.install_path(apk_path)? {
            CommandOutput::Installed(output) => Ok(output),
            _ => Err(ADBError::IOError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} does not exist", apk_path.display()),
            ))),
        }
    }

    fn uninstall(&mut self, package: &str) -> Result<String> {
        self.uninstall_package(package)
    }

    fn reboot(&mut self) -> Result<()> {
        self.reboot_device()
    }
}
