use crate::commands::CommandError;
use crate::frame::Frame;
use crate::session::Session;
use crate::store::{Db, Store};

/// What a command sees while it runs: the whole store and the session that issued it.
pub struct Context<'a> {
    pub store: &'a mut Store,
    pub session: &'a mut Session,
}

impl<'a> Context<'a> {
    pub fn new(store: &'a mut Store, session: &'a mut Session) -> Context<'a> {
        Context { store, session }
    }

    /// The database currently selected by the session.
    pub fn db(&mut self) -> &mut Db {
        self.store.db_mut(self.session.db_index())
    }
}

pub trait Executable {
    fn exec(self, ctx: &mut Context) -> Result<Frame, CommandError>;
}
