pub mod executable;
pub mod get;
pub mod set;

use std::{str, vec};

use bytes::Bytes;
use thiserror::Error as ThisError;

use crate::commands::executable::Executable;
use crate::frame::Frame;
use crate::store::Store;

use get::Get;
use set::Set;

pub(crate) const WRONGTYPE: &str =
    "WRONGTYPE Operation against a key holding the wrong kind of value";

#[derive(Debug, PartialEq)]
pub enum Command {
    Get(Get),
    Set(Set),
}

impl Command {
    /// Turns one request frame into exactly one reply frame. Parse failures
    /// (non-array frame, unknown verb, wrong arity) become error replies
    /// instead of faults, so a bad request never costs the client its
    /// connection.
    pub async fn dispatch(frame: Frame, store: &Store) -> Frame {
        match Command::try_from(frame) {
            Ok(cmd) => cmd.exec(store.clone()).await,
            Err(err) => Frame::Error(format!("ERR {}", err)),
        }
    }
}

impl Executable for Command {
    async fn exec(self, store: Store) -> Frame {
        match self {
            Command::Get(cmd) => cmd.exec(store).await,
            Command::Set(cmd) => cmd.exec(store).await,
        }
    }
}

impl TryFrom<Frame> for Command {
    type Error = CommandParserError;

    fn try_from(frame: Frame) -> Result<Self, Self::Error> {
        // Clients send commands to the Redis server as RESP arrays.
        let frames = match frame {
            Frame::Array(array) => array,
            frame => {
                return Err(CommandParserError::InvalidFrame {
                    expected: "array".to_string(),
                    actual: frame,
                })
            }
        };

        let parser = &mut CommandParser {
            parts: frames.into_iter(),
        };

        let command_name = parser.parse_command_name()?;

        match command_name.to_lowercase().as_str() {
            "get" => Get::try_from(parser).map(Command::Get),
            "set" => Set::try_from(parser).map(Command::Set),
            _ => Err(CommandParserError::UnknownCommand {
                command: command_name,
            }),
        }
    }
}

pub struct CommandParser {
    parts: vec::IntoIter<Frame>,
}

impl CommandParser {
    /// Number of argument frames left, not counting the command name.
    fn remaining(&self) -> usize {
        self.parts.len()
    }

    /// Pulls the command name off the front of the frame, preserving its
    /// original casing for error messages.
    fn parse_command_name(&mut self) -> Result<String, CommandParserError> {
        let command_name = self.parts.next().ok_or(CommandParserError::EmptyCommand)?;

        match command_name {
            Frame::Simple(s) => Ok(s),
            Frame::Bulk(bytes) => str::from_utf8(&bytes[..])
                .map(|s| s.to_string())
                .map_err(CommandParserError::InvalidUTF8String),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "simple or bulk string".to_string(),
                actual: frame,
            }),
        }
    }

    fn next_string(&mut self) -> Result<String, CommandParserError> {
        let frame = self.parts.next().ok_or(CommandParserError::EndOfStream)?;

        match frame {
            // Both `Simple` and `Bulk` representation may be strings.
            Frame::Simple(s) => Ok(s),
            Frame::Bulk(bytes) => str::from_utf8(&bytes[..])
                .map(|s| s.to_string())
                .map_err(CommandParserError::InvalidUTF8String),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "simple or bulk string".to_string(),
                actual: frame,
            }),
        }
    }

    fn next_bytes(&mut self) -> Result<Bytes, CommandParserError> {
        let frame = self.parts.next().ok_or(CommandParserError::EndOfStream)?;

        match frame {
            Frame::Simple(s) => Ok(Bytes::from(s)),
            Frame::Bulk(bytes) => Ok(bytes),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "simple or bulk string".to_string(),
                actual: frame,
            }),
        }
    }
}

#[derive(Debug, ThisError, PartialEq)]
pub enum CommandParserError {
    #[error("protocol error; expected {expected}, got {actual}")]
    InvalidFrame { expected: String, actual: Frame },
    #[error("unknown command '{command}'")]
    UnknownCommand { command: String },
    #[error("wrong number of arguments for '{command}' command")]
    WrongArity { command: &'static str },
    #[error("protocol error; invalid UTF-8 string")]
    InvalidUTF8String(#[from] str::Utf8Error),
    #[error("protocol error; empty command frame")]
    EmptyCommand,
    #[error("protocol error; attempting to extract a value failed due to the frame being fully consumed")]
    EndOfStream,
}
