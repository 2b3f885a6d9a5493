use crate::commands::executable::{Context, Executable};
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;

/// Returns if `member` is a member of the set stored at `key`.
///
/// Ref: <https://redis.io/docs/latest/commands/sismember/>
#[derive(Debug, PartialEq)]
pub struct Sismember {
    pub key: String,
    pub member: String,
}

impl Executable for Sismember {
    fn exec(self, ctx: &mut Context) -> Result<Frame, CommandError> {
        let is_member = ctx
            .db()
            .get_set(&self.key)?
            .is_some_and(|set| set.contains(&self.member));

        Ok(Frame::Integer(is_member as i64))
    }
}

impl TryFrom<&mut CommandParser> for Sismember {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let member = parser.next_string()?;
        parser.finish()?;

        Ok(Self { key, member })
    }
}
