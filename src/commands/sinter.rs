use bytes::Bytes;

use crate::commands::executable::{Context, Executable};
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;
use crate::store::Set;

/// Returns the members of the set resulting from the intersection of all the given sets. A
/// missing key is an empty set, so it empties the result right away.
///
/// Ref: <https://redis.io/docs/latest/commands/sinter/>
#[derive(Debug, PartialEq)]
pub struct Sinter {
    pub keys: Vec<String>,
}

impl Executable for Sinter {
    fn exec(self, ctx: &mut Context) -> Result<Frame, CommandError> {
        let db = ctx.db();
        let mut intersection: Option<Set> = None;

        for key in &self.keys {
            let Some(set) = db.get_set(key)? else {
                return Ok(Frame::Array(vec![]));
            };

            intersection = Some(match intersection {
                Some(acc) => acc.intersection(set).cloned().collect(),
                None => set.clone(),
            });
        }

        let members = intersection
            .unwrap_or_default()
            .into_iter()
            .map(|member| Frame::Bulk(Bytes::from(member)))
            .collect();

        Ok(Frame::Array(members))
    }
}

impl TryFrom<&mut CommandParser> for Sinter {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let keys = parser.remaining_strings()?;
        Ok(Self { keys })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_utils::*;
    use crate::commands::Command;

    fn fixture() -> Fixture {
        let mut fixture = Fixture::new();
        fixture.run(&["SADD", "key1", "a", "b", "c", "d"]).unwrap();
        fixture.run(&["SADD", "key2", "c"]).unwrap();
        fixture.run(&["SADD", "key3", "a", "c", "e"]).unwrap();
        fixture
    }

    #[test]
    fn intersection() {
        let cmd = Command::try_from(request(&["SINTER", "key1", "key3"])).unwrap();
        assert_eq!(
            cmd,
            Command::Sinter(Sinter {
                keys: vec![String::from("key1"), String::from("key3")],
            })
        );

        let mut fixture = fixture();
        assert_eq!(cmd.exec(&mut fixture.ctx()), Ok(bulk_array(&["a", "c"])));
        assert_eq!(
            fixture.run(&["SINTER", "key1", "key2", "key3"]),
            Ok(bulk_array(&["c"]))
        );
        assert_eq!(
            fixture.run(&["SINTER", "key1"]),
            Ok(bulk_array(&["a", "b", "c", "d"]))
        );
    }

    #[test]
    fn missing_key_empties_the_result() {
        let mut fixture = fixture();
        fixture.run(&["SET", "string", "value"]).unwrap();

        assert_eq!(
            fixture.run(&["SINTER", "key1", "missing", "key2"]),
            Ok(bulk_array(&[]))
        );
        // The missing key short-circuits before the type of later keys is checked.
        assert_eq!(
            fixture.run(&["SINTER", "missing", "string"]),
            Ok(bulk_array(&[]))
        );
    }

    #[test]
    fn wrong_type() {
        let mut fixture = fixture();
        fixture.run(&["SET", "string", "value"]).unwrap();

        assert_eq!(
            fixture.run(&["SINTER", "key1", "string"]),
            Err(CommandError::WrongType)
        );
    }
}
