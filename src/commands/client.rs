use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;

/// Connection management: name the connection, record which client library is talking to us and
/// report the session.
///
/// Ref: <https://redis.io/docs/latest/commands/client/>
#[derive(Debug, PartialEq)]
pub enum Client {
    SetName(String),
    GetName,
    SetInfo(LibAttribute),
    Info,
}

/// `CLIENT SETINFO` attributes.
#[derive(Debug, PartialEq)]
pub enum LibAttribute {
    Name(String),
    Version(String),
}

impl Executable for Client {
    fn exec(self, ctx: &mut Context) -> Result<Frame, CommandError> {
        let session = &mut *ctx.session;

        let res = match self {
            Client::SetName(name) => {
                session.connection_name = name;
                Frame::Simple("OK".to_string())
            }
            Client::GetName if session.connection_name.is_empty() => Frame::Null,
            Client::GetName => Frame::Bulk(Bytes::from(session.connection_name.clone())),
            Client::SetInfo(LibAttribute::Name(name)) => {
                session.lib_name = name;
                Frame::Simple("OK".to_string())
            }
            Client::SetInfo(LibAttribute::Version(version)) => {
                session.lib_version = version;
                Frame::Simple("OK".to_string())
            }
            Client::Info => Frame::Bulk(Bytes::from(session.to_string())),
        };

        Ok(res)
    }
}

impl TryFrom<&mut CommandParser> for Client {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let subcommand = parser.next_string()?;

        // Trailing arguments after SETNAME and SETINFO are ignored.
        match subcommand.to_uppercase().as_str() {
            "SETNAME" => {
                let name = parser.next_string()?;
                Ok(Client::SetName(name))
            }
            "GETNAME" => {
                parser.finish()?;
                Ok(Client::GetName)
            }
            "SETINFO" => {
                let attribute = parser.next_string()?;
                let value = parser.next_string()?;

                match attribute.to_uppercase().as_str() {
                    "LIB-NAME" => Ok(Client::SetInfo(LibAttribute::Name(value))),
                    "LIB-VER" => Ok(Client::SetInfo(LibAttribute::Version(value))),
                    _ => Err(CommandError::UnknownSubcommand(attribute)),
                }
            }
            "INFO" => {
                parser.finish()?;
                Ok(Client::Info)
            }
            _ => Err(CommandError::UnknownSubcommand(subcommand)),
        }
    }
}
