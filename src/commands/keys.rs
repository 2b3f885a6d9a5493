use bytes::Bytes;
use itertools::Itertools;

use crate::commands::executable::{Context, Executable};
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;

/// Returns all keys of the selected database matching `pattern`, in key order.
///
/// Only three pattern shapes are understood: `*` matches every key, `prefix*` and `*suffix` match
/// on either end. Anything else must equal the key. Without a pattern every key is returned.
///
/// Ref: <https://redis.io/docs/latest/commands/keys/>
#[derive(Debug, PartialEq)]
pub struct Keys {
    pub pattern: Option<String>,
}

#[derive(Debug, PartialEq)]
enum Pattern<'a> {
    All,
    Prefix(&'a str),
    Suffix(&'a str),
    Exact(&'a str),
}

impl<'a> Pattern<'a> {
    fn new(pattern: &'a str) -> Pattern<'a> {
        if pattern == "*" {
            Pattern::All
        } else if let Some(suffix) = pattern.strip_prefix('*') {
            Pattern::Suffix(suffix)
        } else if let Some(prefix) = pattern.strip_suffix('*') {
            Pattern::Prefix(prefix)
        } else {
            Pattern::Exact(pattern)
        }
    }

    fn matches(&self, key: &str) -> bool {
        match self {
            Pattern::All => true,
            Pattern::Prefix(prefix) => key.starts_with(prefix),
            Pattern::Suffix(suffix) => key.ends_with(suffix),
            Pattern::Exact(exact) => key == *exact,
        }
    }
}

impl Executable for Keys {
    fn exec(self, ctx: &mut Context) -> Result<Frame, CommandError> {
        let pattern = self
            .pattern
            .as_deref()
            .map(Pattern::new)
            .unwrap_or(Pattern::All);

        let keys = ctx
            .db()
            .keys()
            .filter(|key| pattern.matches(key))
            .sorted()
            .map(|key| Frame::Bulk(Bytes::from(key.clone())))
            .collect();

        Ok(Frame::Array(keys))
    }
}

impl TryFrom<&mut CommandParser> for Keys {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let pattern = match parser.has_next() {
            true => Some(parser.next_string()?),
            false => None,
        };
        parser.finish()?;

        Ok(Self { pattern })
    }
}
