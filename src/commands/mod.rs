pub mod client;
pub mod dbsize;
pub mod del;
pub mod executable;
pub mod exists;
pub mod flushdb;
pub mod get;
pub mod keys;
pub mod ping;
pub mod sadd;
pub mod scard;
pub mod select;
pub mod set;
pub mod sinter;
pub mod sismember;
pub mod smembers;
pub mod srem;
pub mod sunion;
pub mod type_;
pub mod zadd;
pub mod zcard;
pub mod zrange;
pub mod zrem;
pub mod zremrangebyscore;
pub mod zscore;

use bytes::Bytes;
use std::{str, vec};
use thiserror::Error as ThisError;

use crate::commands::executable::{Context, Executable};
use crate::frame::Frame;

use client::Client;
use dbsize::DBSize;
use del::Del;
use exists::Exists;
use flushdb::FlushDB;
use get::Get;
use keys::Keys;
use ping::Ping;
use sadd::Sadd;
use scard::Scard;
use select::Select;
use set::Set;
use sinter::Sinter;
use sismember::Sismember;
use smembers::Smembers;
use srem::Srem;
use sunion::Sunion;
use type_::Type;
use zadd::Zadd;
use zcard::Zcard;
use zrange::Zrange;
use zrem::Zrem;
use zremrangebyscore::Zremrangebyscore;
use zscore::Zscore;

#[derive(Debug, PartialEq)]
pub enum Command {
    Del(Del),
    Exists(Exists),
    Get(Get),
    Keys(Keys),
    Set(Set),
    Type(Type),

    Sadd(Sadd),
    Scard(Scard),
    Sinter(Sinter),
    Sismember(Sismember),
    Smembers(Smembers),
    Srem(Srem),
    Sunion(Sunion),

    Zadd(Zadd),
    Zcard(Zcard),
    Zrange(Zrange),
    Zrem(Zrem),
    Zremrangebyscore(Zremrangebyscore),
    Zscore(Zscore),

    Client(Client),
    DBSize(DBSize),
    FlushDB(FlushDB),
    Ping(Ping),
    Select(Select),
}

impl Executable for Command {
    fn exec(self, ctx: &mut Context) -> Result<Frame, CommandError> {
        match self {
            Command::Client(cmd) => cmd.exec(ctx),
            Command::DBSize(cmd) => cmd.exec(ctx),
            Command::Del(cmd) => cmd.exec(ctx),
            Command::Exists(cmd) => cmd.exec(ctx),
            Command::FlushDB(cmd) => cmd.exec(ctx),
            Command::Get(cmd) => cmd.exec(ctx),
            Command::Keys(cmd) => cmd.exec(ctx),
            Command::Ping(cmd) => cmd.exec(ctx),
            Command::Sadd(cmd) => cmd.exec(ctx),
            Command::Scard(cmd) => cmd.exec(ctx),
            Command::Select(cmd) => cmd.exec(ctx),
            Command::Set(cmd) => cmd.exec(ctx),
            Command::Sinter(cmd) => cmd.exec(ctx),
            Command::Sismember(cmd) => cmd.exec(ctx),
            Command::Smembers(cmd) => cmd.exec(ctx),
            Command::Srem(cmd) => cmd.exec(ctx),
            Command::Sunion(cmd) => cmd.exec(ctx),
            Command::Type(cmd) => cmd.exec(ctx),
            Command::Zadd(cmd) => cmd.exec(ctx),
            Command::Zcard(cmd) => cmd.exec(ctx),
            Command::Zrange(cmd) => cmd.exec(ctx),
            Command::Zrem(cmd) => cmd.exec(ctx),
            Command::Zremrangebyscore(cmd) => cmd.exec(ctx),
            Command::Zscore(cmd) => cmd.exec(ctx),
        }
    }
}

impl TryFrom<Frame> for Command {
    type Error = CommandError;

    fn try_from(frame: Frame) -> Result<Self, Self::Error> {
        // Requests always reach us as arrays of bulk strings, see `Frame::parse_request`.
        let frames = match frame {
            Frame::Array(array) => array,
            _ => return Err(CommandError::Syntax),
        };

        let parser = &mut CommandParser {
            parts: frames.into_iter(),
        };

        let command_name = parser.parse_command_name()?;

        match &command_name[..] {
            "CLIENT" => Client::try_from(parser).map(Command::Client),
            "DBSIZE" => DBSize::try_from(parser).map(Command::DBSize),
            "DEL" => Del::try_from(parser).map(Command::Del),
            "EXISTS" => Exists::try_from(parser).map(Command::Exists),
            "FLUSHDB" => FlushDB::try_from(parser).map(Command::FlushDB),
            "GET" => Get::try_from(parser).map(Command::Get),
            "KEYS" => Keys::try_from(parser).map(Command::Keys),
            "PING" => Ping::try_from(parser).map(Command::Ping),
            "SADD" => Sadd::try_from(parser).map(Command::Sadd),
            "SCARD" => Scard::try_from(parser).map(Command::Scard),
            "SELECT" => Select::try_from(parser).map(Command::Select),
            "SET" => Set::try_from(parser).map(Command::Set),
            "SINTER" => Sinter::try_from(parser).map(Command::Sinter),
            "SISMEMBER" => Sismember::try_from(parser).map(Command::Sismember),
            "SMEMBERS" => Smembers::try_from(parser).map(Command::Smembers),
            "SREM" => Srem::try_from(parser).map(Command::Srem),
            "SUNION" => Sunion::try_from(parser).map(Command::Sunion),
            "TYPE" => Type::try_from(parser).map(Command::Type),
            "ZADD" => Zadd::try_from(parser).map(Command::Zadd),
            "ZCARD" => Zcard::try_from(parser).map(Command::Zcard),
            "ZRANGE" => Zrange::try_from(parser).map(Command::Zrange),
            "ZREM" => Zrem::try_from(parser).map(Command::Zrem),
            "ZREMRANGEBYSCORE" => Zremrangebyscore::try_from(parser).map(Command::Zremrangebyscore),
            "ZSCORE" => Zscore::try_from(parser).map(Command::Zscore),
            _ => Err(CommandError::UnknownCommand(command_name)),
        }
    }
}

pub struct CommandParser {
    parts: vec::IntoIter<Frame>,
}

impl CommandParser {
    /// The command name, upper-cased.
    fn parse_command_name(&mut self) -> Result<String, CommandError> {
        self.next_string().map(|name| name.to_uppercase())
    }

    fn next_string(&mut self) -> Result<String, CommandError> {
        let frame = self.parts.next().ok_or(CommandError::WrongArity)?;

        match frame {
            Frame::Bulk(bytes) => str::from_utf8(&bytes[..])
                .map(|s| s.to_string())
                .map_err(|_| CommandError::InvalidUtf8),
            _ => Err(CommandError::Syntax),
        }
    }

    fn next_bytes(&mut self) -> Result<Bytes, CommandError> {
        let frame = self.parts.next().ok_or(CommandError::WrongArity)?;

        match frame {
            Frame::Bulk(bytes) => Ok(bytes),
            _ => Err(CommandError::Syntax),
        }
    }

    /// Every remaining argument as a string. Fails unless at least one is left.
    fn remaining_strings(&mut self) -> Result<Vec<String>, CommandError> {
        let mut strings = vec![self.next_string()?];
        while self.has_next() {
            strings.push(self.next_string()?);
        }
        Ok(strings)
    }

    fn has_next(&self) -> bool {
        self.parts.len() > 0
    }

    /// Commands with a fixed arity call this once every argument has been consumed.
    fn finish(&mut self) -> Result<(), CommandError> {
        match self.parts.next() {
            Some(_) => Err(CommandError::WrongArity),
            None => Ok(()),
        }
    }
}

/// Errors reported to clients as `-ERR <message>`.
#[derive(Debug, ThisError, PartialEq)]
pub enum CommandError {
    #[error("wrong number of arguments for command")]
    WrongArity,
    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType,
    #[error("syntax error")]
    Syntax,
    #[error("value is not an integer or out of range")]
    NotAnInteger,
    #[error("min or max is not a float")]
    NotAFloat,
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("unknown subcommand '{0}'")]
    UnknownSubcommand(String),
    #[error("invalid UTF-8 string")]
    InvalidUtf8,
}

impl From<CommandError> for Frame {
    fn from(err: CommandError) -> Frame {
        Frame::Error(format!("ERR {}", err))
    }
}
