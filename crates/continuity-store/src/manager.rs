use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{db::init_db, error::Result};

/// Shared handle to the embedded SQLite store backing every artifact table
/// (`session_messages`, `user_portrait`, `topic_summary`/`topic_info`,
/// `chat_event`). One `Store` is constructed at startup and cloned (cheaply,
/// via `Arc`) into every worker and the dispatcher's HTTP handlers.
///
/// A single `Mutex<Connection>` is enough for this workload: SQLite itself
/// only allows one writer at a time, and all our operations are short,
/// indexed point queries rather than long scans.
#[derive(Clone)]
pub struct Store {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl Store {
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_shared(conn: Arc<Mutex<Connection>>) -> Result<Self> {
        {
            let guard = conn.lock().unwrap();
            init_db(&guard)?;
        }
        Ok(Self { conn })
    }

    /// Expose the shared connection so co-located subsystems (the job
    /// queue) can initialise their own tables against the same database
    /// file without opening a second connection.
    pub fn shared_connection(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }

    /// Cascade-delete every artifact belonging to `session_id`. Callers
    /// that need per-service parallelism (the dispatcher's `Delete`
    /// endpoint) should call the four artifact-specific `delete_*`
    /// methods concurrently instead; this is the sequential convenience
    /// form used by tests and single-process callers.
    pub fn delete_session_cascade(&self, session_id: &str) -> Result<()> {
        self.delete_messages(session_id)?;
        self.delete_portrait(session_id)?;
        self.delete_topics(session_id)?;
        self.delete_events(session_id)?;
        Ok(())
    }
}
