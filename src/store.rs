use bytes::Bytes;
use std::collections::{BTreeSet, HashMap};

use crate::commands::CommandError;
use crate::sorted_set::SortedSet;

/// Number of logical databases, selectable with `SELECT 0..=7`.
pub const DATABASES: usize = 8;

/// The process-wide data set: a fixed array of independent logical databases.
///
/// The store is owned by the engine and only ever touched by one command at a time.
#[derive(Debug)]
pub struct Store {
    dbs: [Db; DATABASES],
}

impl Store {
    pub fn new() -> Store {
        Store {
            dbs: std::array::from_fn(|_| Db::default()),
        }
    }

    /// Panics if `index` is not below `DATABASES`. Sessions only hold validated indexes.
    pub fn db(&self, index: usize) -> &Db {
        &self.dbs[index]
    }

    pub fn db_mut(&mut self, index: usize) -> &mut Db {
        &mut self.dbs[index]
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

pub type Set = BTreeSet<String>;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(Bytes),
    Set(Set),
    SortedSet(SortedSet),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::String(_) => ValueType::String,
            Value::Set(_) => ValueType::Set,
            Value::SortedSet(_) => ValueType::SortedSet,
        }
    }
}

/// The names reported by `TYPE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display, strum_macros::AsRefStr)]
pub enum ValueType {
    #[strum(serialize = "none")]
    None,
    #[strum(serialize = "string")]
    String,
    #[strum(serialize = "set")]
    Set,
    #[strum(serialize = "zset")]
    SortedSet,
}

/// One logical database: a key space mapping keys to typed values.
#[derive(Debug, Default)]
pub struct Db {
    keys: HashMap<String, Value>,
}

impl Db {
    pub fn lookup_type_of(&self, key: &str) -> ValueType {
        self.keys
            .get(key)
            .map(Value::value_type)
            .unwrap_or(ValueType::None)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.keys.get(key)
    }

    /// Stores a string, replacing an existing string. Other types are left untouched.
    pub fn set(&mut self, key: String, data: Bytes) -> Result<(), CommandError> {
        match self.keys.get_mut(&key) {
            Some(Value::String(current)) => *current = data,
            Some(_) => return Err(CommandError::WrongType),
            None => {
                self.keys.insert(key, Value::String(data));
            }
        }
        Ok(())
    }

    /// The set stored at `key`, created empty if the key is absent.
    pub fn sets(&mut self, key: &str) -> Result<&mut Set, CommandError> {
        let value = self
            .keys
            .entry(key.to_string())
            .or_insert_with(|| Value::Set(Set::new()));

        match value {
            Value::Set(set) => Ok(set),
            Value::String(_) | Value::SortedSet(_) => Err(CommandError::WrongType),
        }
    }

    /// The sorted set stored at `key`, created empty if the key is absent.
    pub fn sorted_sets(&mut self, key: &str) -> Result<&mut SortedSet, CommandError> {
        let value = self
            .keys
            .entry(key.to_string())
            .or_insert_with(|| Value::SortedSet(SortedSet::new()));

        match value {
            Value::SortedSet(zset) => Ok(zset),
            Value::String(_) | Value::Set(_) => Err(CommandError::WrongType),
        }
    }

    /// Read-only access to the set at `key`. `Ok(None)` if the key is absent.
    pub fn get_set(&self, key: &str) -> Result<Option<&Set>, CommandError> {
        match self.keys.get(key) {
            Some(Value::Set(set)) => Ok(Some(set)),
            Some(Value::String(_) | Value::SortedSet(_)) => Err(CommandError::WrongType),
            None => Ok(None),
        }
    }

    /// Read-only access to the sorted set at `key`. `Ok(None)` if the key is absent.
    pub fn get_sorted_set(&self, key: &str) -> Result<Option<&SortedSet>, CommandError> {
        match self.keys.get(key) {
            Some(Value::SortedSet(zset)) => Ok(Some(zset)),
            Some(Value::String(_) | Value::Set(_)) => Err(CommandError::WrongType),
            None => Ok(None),
        }
    }

    /// Drops `key` if it holds an empty set or sorted set.
    pub fn remove_if_empty(&mut self, key: &str) {
        let empty = match self.keys.get(key) {
            Some(Value::Set(set)) => set.is_empty(),
            Some(Value::SortedSet(zset)) => zset.is_empty(),
            Some(Value::String(_)) | None => false,
        };

        if empty {
            self.keys.remove(key);
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.keys.remove(key)
    }

    pub fn exists(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    pub fn size(&self) -> usize {
        self.keys.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.keys.keys()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }
}
