use std::path::PathBuf;

use super::DirEntry;

/// An operation to run on a connected device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ADBCommand {
    /// Run a command and collect its output; `print` also echoes it to stdout
    Shell { command: String, print: bool },
    /// Copy a local file into a device directory
    Push { source: PathBuf, destination: String },
    /// Copy a device file to a local path
    Pull { source: String, destination: PathBuf },
    List { remote_path: String },
    Install { source: PathBuf },
    Uninstall { package_name: String },
    Reboot,
}

/// Result of an [`ADBCommand`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    Shell(String),
    /// Bytes written to the local destination
    Pulled(u64),
    Listing(Vec<DirEntry>),
    /// Output of `pm install`
    Installed(String),
    /// Output of `pm uninstall`
    Uninstalled(String),
    Done,
    /// The local push source or the remote pull/list source does not exist
    FileNotFound(String),
}

impl CommandOutput {
    pub fn is_file_not_found(&self) -> bool {
        matches!(self, CommandOutput::FileNotFound(_))
    }
}
