use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;
use crate::store::Set;

/// Returns the members of the set resulting from the union of all the given sets. Keys that do
/// not exist are considered to be empty sets.
///
/// Ref: <https://redis.io/docs/latest/commands/sunion/>
#[derive(Debug, PartialEq)]
pub struct Sunion {
    pub keys: Vec<String>,
}

impl Executable for Sunion {
    fn exec(self, ctx: &mut Context) -> Result<Frame, CommandError> {
        let db = ctx.db();
        let mut union = Set::new();

        for key in &self.keys {
            if let Some(set) = db.get_set(key)? {
                union.extend(set.iter().cloned());
            }
        }

        let members = union
            .into_iter()
            .map(|member| Frame::Bulk(Bytes::from(member)))
            .collect();

        Ok(Frame::Array(members))
    }
}

impl TryFrom<&mut CommandParser> for Sunion {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let keys = parser.remaining_strings()?;
        Ok(Self { keys })
    }
}
