use crate::commands::executable::{Context, Executable};
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;

/// Delete all the keys of the currently selected database. Other databases are left untouched.
///
/// Ref: <https://redis.io/docs/latest/commands/flushdb/>
#[derive(Debug, PartialEq)]
pub struct FlushDB;

impl Executable for FlushDB {
    fn exec(self, ctx: &mut Context) -> Result<Frame, CommandError> {
        ctx.db().clear();
        Ok(Frame::Simple("OK".to_string()))
    }
}

impl TryFrom<&mut CommandParser> for FlushDB {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.finish()?;
        Ok(Self)
    }
}
