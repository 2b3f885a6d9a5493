use itertools::Itertools;

use crate::commands::executable::{Context, Executable};
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;
use crate::utils::score::parse_score;

/// Adds all the specified members with the specified scores to the sorted set stored at `key`.
/// Members already present get their score updated.
///
/// Pairs whose score does not parse are skipped without an error, and are not counted.
///
/// Ref: <https://redis.io/docs/latest/commands/zadd/>
#[derive(Debug, PartialEq)]
pub struct Zadd {
    pub key: String,
    pub members: Vec<(f64, String)>,
}

impl Executable for Zadd {
    fn exec(self, ctx: &mut Context) -> Result<Frame, CommandError> {
        let db = ctx.db();
        let zset = db.sorted_sets(&self.key)?;

        let added = self
            .members
            .iter()
            .filter(|(score, member)| zset.insert(member, *score))
            .count();

        // Every score was skipped on a key that did not exist yet.
        db.remove_if_empty(&self.key);

        Ok(Frame::Integer(added as i64))
    }
}

impl TryFrom<&mut CommandParser> for Zadd {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let args = parser.remaining_strings()?;

        if args.len() < 2 {
            return Err(CommandError::WrongArity);
        }
        if args.len() % 2 != 0 {
            return Err(CommandError::Syntax);
        }

        let members = args
            .into_iter()
            .tuples::<(String, String)>()
            .filter_map(|(score, member)| parse_score(&score).map(|score| (score, member)))
            .collect();

        Ok(Self { key, members })
    }
}
