//! Database module using DuckDB
//!
//! DuckDB reads the CSV inputs (with schema inference) and writes the CSV
//! result sets. A [`Session`] is the execution context of one run: it is
//! opened before the inputs are loaded and released once the last result
//! set has been written, or dropped on any earlier failure.

mod export;
mod queries;
pub mod schema;

pub use export::{output_path, write_result_set, ResultRow};

use std::path::Path;

use duckdb::Connection;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::records::{Catalog, ListeningEvent};

use schema::{LISTENING_LOGS, SONGS_METADATA};

/// Execution context wrapping an in-memory DuckDB database.
pub struct Session {
    conn: Option<Connection>,
}

impl Session {
    /// Open a fresh in-memory session.
    pub fn open() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        debug!("Session opened");
        Ok(Self { conn: Some(conn) })
    }

    fn conn(&self) -> Result<&Connection> {
        self.conn
            .as_ref()
            .ok_or_else(|| Error::other("session already closed"))
    }

    /// Load and validate the listening log.
    pub fn load_listening_events(&self, path: &Path) -> Result<Vec<ListeningEvent>> {
        let conn = self.conn()?;
        let rows = queries::load_table(conn, path, &LISTENING_LOGS)?;
        let events = queries::select_listening_events(conn)?;
        info!("Loaded {} listening events from {}", rows, path.display());
        Ok(events)
    }

    /// Load and validate the song catalog.
    pub fn load_catalog(&self, path: &Path) -> Result<Catalog> {
        let conn = self.conn()?;
        let rows = queries::load_table(conn, path, &SONGS_METADATA)?;
        let catalog = Catalog::new(queries::select_songs(conn)?);
        info!(
            "Loaded {} catalog rows ({} distinct songs) from {}",
            rows,
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// A second connection to the same database, for use on another thread.
    pub fn handle(&self) -> Result<Connection> {
        Ok(self.conn()?.try_clone()?)
    }

    /// Release the session, surfacing any error from closing the database.
    pub fn close(mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            conn.close().map_err(|(_, err)| Error::from(err))?;
            debug!("Session closed");
        }
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Err((_, err)) = conn.close() {
                warn!("Error releasing session: {}", err);
            } else {
                debug!("Session released");
            }
        }
    }
}
