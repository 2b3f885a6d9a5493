use crate::commands::executable::{Context, Executable};
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;

/// Returns the number of members of the sorted set stored at `key`, 0 if the key does not exist.
///
/// Ref: <https://redis.io/docs/latest/commands/zcard/>
#[derive(Debug, PartialEq)]
pub struct Zcard {
    pub key: String,
}

impl Executable for Zcard {
    fn exec(self, ctx: &mut Context) -> Result<Frame, CommandError> {
        let len = ctx
            .db()
            .get_sorted_set(&self.key)?
            .map_or(0, |zset| zset.len());

        Ok(Frame::Integer(len as i64))
    }
}

impl TryFrom<&mut CommandParser> for Zcard {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        parser.finish()?;

        Ok(Self { key })
    }
}
