mod adb_command;
mod adb_rsa_key;
mod adb_stat_response;
mod dir_entry;
mod message_commands;

pub use adb_command::{ADBCommand, CommandOutput};
pub use adb_rsa_key::{ADBRsaKey, TokenSigner};
pub use adb_stat_response::AdbStatResponse;
pub use dir_entry::DirEntry;
pub use message_commands::{MessageCommand, MessageSubcommand, SubcommandWithArg};
