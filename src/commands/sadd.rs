use crate::commands::executable::{Context, Executable};
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;

/// Add the specified members to the set stored at `key`, creating the set if needed. Members
/// already present are ignored.
///
/// Ref: <https://redis.io/docs/latest/commands/sadd/>
#[derive(Debug, PartialEq)]
pub struct Sadd {
    pub key: String,
    pub members: Vec<String>,
}

impl Executable for Sadd {
    fn exec(self, ctx: &mut Context) -> Result<Frame, CommandError> {
        let set = ctx.db().sets(&self.key)?;

        let added = self
            .members
            .into_iter()
            .filter(|member| set.insert(member.clone()))
            .count();

        Ok(Frame::Integer(added as i64))
    }
}

impl TryFrom<&mut CommandParser> for Sadd {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let members = parser.remaining_strings()?;

        Ok(Self { key, members })
    }
}
