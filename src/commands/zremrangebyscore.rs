use crate::commands::executable::{Context, Executable};
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;
use crate::utils::score::parse_score;

/// Removes all members in the sorted set stored at `key` with a score between `min` and `max`,
/// both inclusive. The key is deleted once the sorted set is empty.
///
/// Ref: <https://redis.io/docs/latest/commands/zremrangebyscore/>
#[derive(Debug, PartialEq)]
pub struct Zremrangebyscore {
    pub key: String,
    pub min: String,
    pub max: String,
}

impl Executable for Zremrangebyscore {
    fn exec(self, ctx: &mut Context) -> Result<Frame, CommandError> {
        let db = ctx.db();
        if db.get_sorted_set(&self.key)?.is_none() {
            return Ok(Frame::Integer(0));
        }

        let (Some(min), Some(max)) = (parse_score(&self.min), parse_score(&self.max)) else {
            return Err(CommandError::NotAFloat);
        };
        if max < min {
            return Ok(Frame::Integer(0));
        }

        let removed = db.sorted_sets(&self.key)?.remove_range_by_score(min, max);
        db.remove_if_empty(&self.key);

        Ok(Frame::Integer(removed as i64))
    }
}

impl TryFrom<&mut CommandParser> for Zremrangebyscore {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let min = parser.next_string()?;
        let max = parser.next_string()?;
        parser.finish()?;

        Ok(Self { key, min, max })
    }
}
