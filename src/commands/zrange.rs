use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;
use crate::utils::score::{format_score, parse_score};

/// Returns the specified range of members in the sorted set stored at `key`.
///
/// By default `start` and `stop` are inclusive, non-negative positions in member-name order.
/// With `BYSCORE` they are inclusive score bounds and members come ordered by score. With
/// `WITHSCORES` each member is followed by its score.
///
/// Ref: <https://redis.io/docs/latest/commands/zrange/>
#[derive(Debug, PartialEq)]
pub struct Zrange {
    pub key: String,
    pub start: String,
    pub stop: String,
    /// Validated only once the key is known to hold a sorted set.
    pub flags: Vec<String>,
}

#[derive(Debug, Default, PartialEq)]
struct RangeOptions {
    by_score: bool,
    with_scores: bool,
}

impl RangeOptions {
    /// Accepts `BYSCORE`, `WITHSCORES` or `BYSCORE WITHSCORES`, in any case.
    fn parse(flags: &[String]) -> Result<RangeOptions, CommandError> {
        let flags: Vec<String> = flags.iter().map(|flag| flag.to_uppercase()).collect();
        let flags: Vec<&str> = flags.iter().map(String::as_str).collect();

        match flags[..] {
            [] => Ok(RangeOptions::default()),
            ["BYSCORE"] => Ok(RangeOptions {
                by_score: true,
                with_scores: false,
            }),
            ["WITHSCORES"] => Ok(RangeOptions {
                by_score: false,
                with_scores: true,
            }),
            ["BYSCORE", "WITHSCORES"] => Ok(RangeOptions {
                by_score: true,
                with_scores: true,
            }),
            _ => Err(CommandError::Syntax),
        }
    }
}

impl Executable for Zrange {
    fn exec(self, ctx: &mut Context) -> Result<Frame, CommandError> {
        let Some(zset) = ctx.db().get_sorted_set(&self.key)? else {
            return Ok(Frame::Array(vec![]));
        };

        let options = RangeOptions::parse(&self.flags)?;

        let range: Vec<(&str, f64)> = if options.by_score {
            let (Some(min), Some(max)) = (parse_score(&self.start), parse_score(&self.stop)) else {
                return Err(CommandError::NotAFloat);
            };
            if max < min {
                return Ok(Frame::Array(vec![]));
            }

            zset.range_by_score(min, max).collect()
        } else {
            let (Ok(start), Ok(stop)) = (self.start.parse::<i64>(), self.stop.parse::<i64>()) else {
                return Err(CommandError::NotAnInteger);
            };
            if stop < start {
                return Ok(Frame::Array(vec![]));
            }
            // Negative indexes counting from the end are not supported.
            if start < 0 || stop < 0 {
                return Err(CommandError::Syntax);
            }

            zset.range_by_index(start as usize, stop as usize).collect()
        };

        let mut res = Vec::with_capacity(range.len() * (1 + options.with_scores as usize));
        for (member, score) in range {
            res.push(Frame::Bulk(Bytes::from(member.to_string())));
            if options.with_scores {
                res.push(Frame::Bulk(Bytes::from(format_score(score))));
            }
        }

        Ok(Frame::Array(res))
    }
}

impl TryFrom<&mut CommandParser> for Zrange {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let start = parser.next_string()?;
        let stop = parser.next_string()?;

        let mut flags = vec![];
        while parser.has_next() {
            flags.push(parser.next_string()?);
        }

        Ok(Self {
            key,
            start,
            stop,
            flags,
        })
    }
}
