use bytes::Bytes;
use std::io::Cursor;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};

use crate::commands::executable::{Context, Executable};
use crate::commands::{Command, CommandError};
use crate::frame::Frame;
use crate::session::{ConnectionId, Sessions};
use crate::store::Store;

/// A message for the engine. An empty payload tells that the connection was closed.
#[derive(Debug)]
pub struct Request {
    pub connection_id: ConnectionId,
    pub payload: Bytes,
    /// `None` when the request produced no reply.
    pub reply: oneshot::Sender<Option<Bytes>>,
}

/// Owns every database and session, and executes one request at a time.
#[derive(Debug, Default)]
pub struct Engine {
    store: Store,
    sessions: Sessions,
}

impl Engine {
    pub fn new() -> Engine {
        Engine::default()
    }

    /// Serves requests until every sender is dropped.
    pub async fn run(mut self, mut requests: mpsc::UnboundedReceiver<Request>) {
        while let Some(request) = requests.recv().await {
            let reply = self.handle(request.connection_id, &request.payload);
            // The connection may be gone already, nobody is left to answer.
            let _ = request.reply.send(reply);
        }
    }

    /// Handles one message from a connection and returns the bytes to write back, if any.
    pub fn handle(&mut self, connection_id: ConnectionId, payload: &[u8]) -> Option<Bytes> {
        if payload.is_empty() {
            if let Some(client_number) = self.sessions.remove(&connection_id) {
                info!("Client {} removed", client_number);
            }
            return None;
        }

        let (session, created) = self.sessions.get_or_create(connection_id);
        let client_number = session.client_number;
        if created {
            info!("Client {} created", client_number);
        }

        let frame = match Frame::parse_request(&mut Cursor::new(payload)) {
            Ok(frame) => frame,
            Err(err) => {
                warn!(
                    "Client {} sent a malformed request ({}): {:?}",
                    client_number,
                    err,
                    String::from_utf8_lossy(payload)
                );
                return None;
            }
        };

        let name = command_name(&frame);
        let store = &mut self.store;
        let started = Instant::now();

        let res = panic::catch_unwind(AssertUnwindSafe(|| {
            let cmd = Command::try_from(frame)?;
            cmd.exec(&mut Context::new(store, session))
        }));

        let elapsed = started.elapsed();

        match res {
            Ok(Ok(frame)) => {
                info!("{} from client {} took {:?}", name, client_number, elapsed);
                Some(frame.into())
            }
            Ok(Err(err @ CommandError::UnknownCommand(_))) => {
                warn!("{} from client {} took {:?}", err, client_number, elapsed);
                Some(Frame::from(err).into())
            }
            Ok(Err(err)) => {
                info!(
                    "{} from client {} took {:?}, failed: {}",
                    name, client_number, elapsed, err
                );
                Some(Frame::from(err).into())
            }
            Err(_) => {
                error!("{} from client {} aborted", name, client_number);
                None
            }
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn sessions(&self) -> &Sessions {
        &self.sessions
    }
}

/// The upper-cased command name, for logging.
fn command_name(frame: &Frame) -> String {
    match frame {
        Frame::Array(parts) => match parts.first() {
            Some(Frame::Bulk(name)) => String::from_utf8_lossy(name).to_uppercase(),
            _ => String::new(),
        },
        _ => String::new(),
    }
}
