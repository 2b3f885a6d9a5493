use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;

/// Returns the string representation of the type of the value stored at `key`: `string`, `set`
/// or `zset`. If the key does not exist, `none` is returned.
///
/// Ref: <https://redis.io/docs/latest/commands/type/>
#[derive(Debug, PartialEq)]
pub struct Type {
    pub key: String,
}

impl Executable for Type {
    fn exec(self, ctx: &mut Context) -> Result<Frame, CommandError> {
        let type_ = ctx.db().lookup_type_of(&self.key);

        Ok(Frame::Bulk(Bytes::from(type_.to_string())))
    }
}

impl TryFrom<&mut CommandParser> for Type {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        parser.finish()?;

        Ok(Self { key })
    }
}
