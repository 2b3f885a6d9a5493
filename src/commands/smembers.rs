use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;

/// Returns all the members of the set value stored at `key`, in member order.
///
/// Ref: <https://redis.io/docs/latest/commands/smembers/>
#[derive(Debug, PartialEq)]
pub struct Smembers {
    pub key: String,
}

impl Executable for Smembers {
    fn exec(self, ctx: &mut Context) -> Result<Frame, CommandError> {
        let members = match ctx.db().get_set(&self.key)? {
            Some(set) => set
                .iter()
                .map(|member| Frame::Bulk(Bytes::from(member.clone())))
                .collect(),
            None => vec![],
        };

        Ok(Frame::Array(members))
    }
}

impl TryFrom<&mut CommandParser> for Smembers {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        parser.finish()?;

        Ok(Self { key })
    }
}
