use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use std::fmt::Display;

use crate::ADBError;

/// Packet opcodes understood by this client.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Serialize_repr, Deserialize_repr)]
#[repr(u32)]
pub enum MessageCommand {
    /// Connect to a device
    Cnxn = 0x4e58_4e43,
    /// Authentication exchange (token, signature, public key)
    Auth = 0x4854_5541,
    /// Open a stream to a service
    Open = 0x4e45_504f,
    /// Stream is ready / acknowledge a write
    Okay = 0x5941_4b4f,
    /// Write data to a stream
    Write = 0x4554_5257,
    /// Close a stream
    Clse = 0x4553_4c43,
}

impl MessageCommand {
    pub const ALL: [MessageCommand; 6] = [
        MessageCommand::Cnxn,
        MessageCommand::Auth,
        MessageCommand::Open,
        MessageCommand::Okay,
        MessageCommand::Write,
        MessageCommand::Clse,
    ];
}

impl TryFrom<u32> for MessageCommand {
    type Error = ADBError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        MessageCommand::ALL
            .into_iter()
            .find(|command| *command as u32 == value)
            .ok_or(ADBError::InvalidCommand(value))
    }
}

impl Display for MessageCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MessageCommand::Cnxn => "CNXN",
            MessageCommand::Auth => "AUTH",
            MessageCommand::Open => "OPEN",
            MessageCommand::Okay => "OKAY",
            MessageCommand::Write => "WRTE",
            MessageCommand::Clse => "CLSE",
        };
        write!(f, "{name}")
    }
}

/// Sync sub-commands, carried inside `WRTE` payloads of a `sync:` stream.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Serialize_repr, Deserialize_repr)]
#[repr(u32)]
pub enum MessageSubcommand {
    Stat = 0x5441_5453,
    List = 0x5453_494c,
    Send = 0x444e_4553,
    Recv = 0x5643_4552,
    Data = 0x4154_4144,
    Done = 0x454e_4f44,
    Quit = 0x5449_5551,
    Okay = 0x5941_4b4f,
    Fail = 0x4c49_4146,
    Dent = 0x544e_4544,
}

impl MessageSubcommand {
    /// Pair this sub-command with its argument (a length, a mode or a timestamp).
    pub fn with_arg(self, arg: u32) -> SubcommandWithArg {
        SubcommandWithArg {
            subcommand: self,
            arg,
        }
    }

    /// Recognize a sub-command word, if it is one.
    pub fn from_word(word: u32) -> Option<Self> {
        [
            MessageSubcommand::Stat,
            MessageSubcommand::List,
            MessageSubcommand::Send,
            MessageSubcommand::Recv,
            MessageSubcommand::Data,
            MessageSubcommand::Done,
            MessageSubcommand::Quit,
            MessageSubcommand::Okay,
            MessageSubcommand::Fail,
            MessageSubcommand::Dent,
        ]
        .into_iter()
        .find(|subcommand| *subcommand as u32 == word)
    }
}

/// 8-byte sync request header: sub-command word followed by its argument.
#[derive(Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SubcommandWithArg {
    subcommand: MessageSubcommand,
    arg: u32,
}

impl SubcommandWithArg {
    pub fn subcommand(&self) -> MessageSubcommand {
        self.subcommand
    }

    pub fn arg(&self) -> u32 {
        self.arg
    }
}
