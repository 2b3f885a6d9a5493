use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;
use crate::utils::score::format_score;

/// Returns the score of `member` in the sorted set at `key`, nil if either is missing.
///
/// Ref: <https://redis.io/docs/latest/commands/zscore/>
#[derive(Debug, PartialEq)]
pub struct Zscore {
    pub key: String,
    pub member: String,
}

impl Executable for Zscore {
    fn exec(self, ctx: &mut Context) -> Result<Frame, CommandError> {
        let score = ctx
            .db()
            .get_sorted_set(&self.key)?
            .and_then(|zset| zset.score(&self.member));

        match score {
            Some(score) => Ok(Frame::Bulk(Bytes::from(format_score(score)))),
            None => Ok(Frame::Null),
        }
    }
}

impl TryFrom<&mut CommandParser> for Zscore {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let member = parser.next_string()?;
        parser.finish()?;

        Ok(Self { key, member })
    }
}
