use crate::commands::executable::{Context, Executable};
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;

/// Removes the specified members from the sorted set stored at `key`. The key is deleted once the
/// sorted set is empty.
///
/// Ref: <https://redis.io/docs/latest/commands/zrem/>
#[derive(Debug, PartialEq)]
pub struct Zrem {
    pub key: String,
    pub members: Vec<String>,
}

impl Executable for Zrem {
    fn exec(self, ctx: &mut Context) -> Result<Frame, CommandError> {
        let db = ctx.db();
        if db.get_sorted_set(&self.key)?.is_none() {
            return Ok(Frame::Integer(0));
        }

        let zset = db.sorted_sets(&self.key)?;
        let removed = self
            .members
            .iter()
            .filter(|member| zset.remove(member))
            .count();
        db.remove_if_empty(&self.key);

        Ok(Frame::Integer(removed as i64))
    }
}

impl TryFrom<&mut CommandParser> for Zrem {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let members = parser.remaining_strings()?;

        Ok(Self { key, members })
    }
}
