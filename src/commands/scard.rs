use crate::commands::executable::{Context, Executable};
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;

/// Returns the set cardinality of the set stored at `key`, 0 if the key does not exist.
///
/// Ref: <https://redis.io/docs/latest/commands/scard/>
#[derive(Debug, PartialEq)]
pub struct Scard {
    pub key: String,
}

impl Executable for Scard {
    fn exec(self, ctx: &mut Context) -> Result<Frame, CommandError> {
        let len = ctx.db().get_set(&self.key)?.map_or(0, |set| set.len());

        Ok(Frame::Integer(len as i64))
    }
}

impl TryFrom<&mut CommandParser> for Scard {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        parser.finish()?;

        Ok(Self { key })
    }
}
