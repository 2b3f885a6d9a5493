use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

use crate::commands::CommandError;
use crate::store::DATABASES;

/// Identifies one transport connection for as long as it stays open.
pub type ConnectionId = Uuid;

/// Per-connection state.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub connection_id: ConnectionId,
    /// Process-wide, assigned from 1 upwards and never reused.
    pub client_number: u64,
    db_index: usize,
    pub lib_name: String,
    pub lib_version: String,
    pub connection_name: String,
}

impl Session {
    pub fn new(connection_id: ConnectionId, client_number: u64) -> Session {
        Session {
            connection_id,
            client_number,
            db_index: 0,
            lib_name: String::new(),
            lib_version: String::new(),
            connection_name: String::new(),
        }
    }

    pub fn db_index(&self) -> usize {
        self.db_index
    }

    /// Switches the selected database. Out of range indexes leave the session unchanged.
    pub fn select(&mut self, index: i64) -> Result<(), CommandError> {
        match usize::try_from(index) {
            Ok(index) if index < DATABASES => {
                self.db_index = index;
                Ok(())
            }
            _ => Err(CommandError::NotAnInteger),
        }
    }
}

/// Rendered by `CLIENT INFO`. Metrics that are not tracked are reported as zero.
impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id={} name={} db={} lib-name={} lib-ver={}",
            self.client_number,
            self.connection_name,
            self.db_index,
            self.lib_name,
            self.lib_version
        )?;
        write!(
            f,
            " age=0 idle=0 multi=0 sub=0 psub=0 qbuf=0 qbuf-free=0 argv-mem=0 obl=0 oll=0 omem=0 tot-mem=0"
        )
    }
}

/// Every live session, keyed by connection id.
#[derive(Debug, Default)]
pub struct Sessions {
    clients: HashMap<ConnectionId, Session>,
    counter: u64,
}

impl Sessions {
    pub fn new() -> Sessions {
        Sessions::default()
    }

    /// Returns the session for `id` and whether it was created by this call.
    pub fn get_or_create(&mut self, id: ConnectionId) -> (&mut Session, bool) {
        let mut created = false;
        let counter = &mut self.counter;
        let session = self.clients.entry(id).or_insert_with(|| {
            created = true;
            *counter += 1;
            Session::new(id, *counter)
        });

        (session, created)
    }

    /// Removes the session for `id`, returning its client number.
    pub fn remove(&mut self, id: &ConnectionId) -> Option<u64> {
        self.clients
            .remove(id)
            .map(|session| session.client_number)
    }

    pub fn get(&self, id: &ConnectionId) -> Option<&Session> {
        self.clients.get(id)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
