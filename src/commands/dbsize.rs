use crate::commands::executable::{Context, Executable};
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;

/// Return the number of keys in the currently-selected database.
///
/// Ref: <https://redis.io/docs/latest/commands/dbsize/>
#[derive(Debug, PartialEq)]
pub struct DBSize;

impl Executable for DBSize {
    fn exec(self, ctx: &mut Context) -> Result<Frame, CommandError> {
        Ok(Frame::Integer(ctx.db().size() as i64))
    }
}

impl TryFrom<&mut CommandParser> for DBSize {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.finish()?;
        Ok(Self)
    }
}
