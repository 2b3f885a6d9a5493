use crate::commands::executable::{Context, Executable};
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;

/// Select the logical database having the specified zero-based numeric index. New connections
/// always use the database 0.
///
/// Ref: <https://redis.io/docs/latest/commands/select>
#[derive(Debug, PartialEq)]
pub struct Select {
    pub index: i64,
}

impl Executable for Select {
    fn exec(self, ctx: &mut Context) -> Result<Frame, CommandError> {
        ctx.session.select(self.index)?;
        Ok(Frame::Simple("OK".to_string()))
    }
}

impl TryFrom<&mut CommandParser> for Select {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let index = parser.next_string()?;
        parser.finish()?;

        let index = index
            .parse::<i64>()
            .map_err(|_| CommandError::NotAnInteger)?;

        Ok(Self { index })
    }
}
