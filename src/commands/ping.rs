use crate::commands::executable::{Context, Executable};
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;

/// Returns PONG. Unlike Redis, no argument is accepted.
///
/// Ref: <https://redis.io/docs/latest/commands/ping>
#[derive(Debug, PartialEq)]
pub struct Ping;

impl Executable for Ping {
    fn exec(self, _ctx: &mut Context) -> Result<Frame, CommandError> {
        Ok(Frame::Simple("PONG".to_string()))
    }
}

impl TryFrom<&mut CommandParser> for Ping {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.finish()?;
        Ok(Self)
    }
}
