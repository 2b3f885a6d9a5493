use crate::commands::executable::{Context, Executable};
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;

/// Remove the specified members from the set stored at `key`. The key is deleted once the set is
/// empty.
///
/// Ref: <https://redis.io/docs/latest/commands/srem/>
#[derive(Debug, PartialEq)]
pub struct Srem {
    pub key: String,
    pub members: Vec<String>,
}

impl Executable for Srem {
    fn exec(self, ctx: &mut Context) -> Result<Frame, CommandError> {
        let db = ctx.db();
        if db.get_set(&self.key)?.is_none() {
            return Ok(Frame::Integer(0));
        }

        let set = db.sets(&self.key)?;
        let removed = self
            .members
            .iter()
            .filter(|member| set.remove(*member))
            .count();
        db.remove_if_empty(&self.key);

        Ok(Frame::Integer(removed as i64))
    }
}

impl TryFrom<&mut CommandParser> for Srem {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let members = parser.remaining_strings()?;

        Ok(Self { key, members })
    }
}
