//! Shared SQLite handle for the rendezvous store and exchange ledger
//!
//! The database is the single source of truth: no component caches session
//! or participant state across calls. All mutations are durable before the
//! operation returns.

use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::Result;

/// Extended SQLite result codes for constraint violations we translate into
/// protocol errors.
const SQLITE_CONSTRAINT_PRIMARYKEY: i32 = 1555;
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;

/// Shared database handle.
///
/// A single connection behind a mutex serializes all statements; the lock
/// also provides the per-session critical section that atomic role
/// assignment requires.
pub struct SignalingDb {
    conn: Mutex<Connection>,
}

impl SignalingDb {
    /// Open (or create) the signaling database at `path`.
    pub fn open(path: &Path) -> Result<Arc<Self>> {
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "signaling database opened");
        Self::init(conn)
    }

    /// Open an in-memory database. Used by tests and throwaway deployments.
    pub fn open_in_memory() -> Result<Arc<Self>> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Arc<Self>> {
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Arc::new(Self {
            conn: Mutex::new(conn),
        }))
    }

    /// Run `f` with the connection held.
    pub(crate) fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.conn.lock();
        f(&conn)
    }

    /// Run `f` with mutable access, for operations that open a transaction.
    pub(crate) fn with_conn_mut<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> Result<T>,
    ) -> Result<T> {
        let mut conn = self.conn.lock();
        f(&mut conn)
    }
}

/// True when `err` is a UNIQUE or PRIMARY KEY constraint violation, i.e. an
/// insert collided with an existing row rather than failing outright.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == SQLITE_CONSTRAINT_PRIMARYKEY
    )
}
