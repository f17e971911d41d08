//! CSV ingest queries for DuckDB

use std::path::Path;

use duckdb::Connection;
use tracing::debug;

use crate::error::{Error, Result};
use crate::records::{ListeningEvent, Song};

use super::schema::{InputSchema, LISTENING_LOGS, SONGS_METADATA};

/// Quote a string as a SQL literal.
pub(crate) fn sql_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// `read_csv_auto(...)` call for an input file.
fn csv_source(path: &Path, schema: Option<&InputSchema>) -> String {
    let mut source = format!(
        "read_csv_auto({}, header = true",
        sql_literal(&path.to_string_lossy())
    );
    if let Some(types) = schema.and_then(InputSchema::type_overrides) {
        source.push_str(&format!(", types = {types}"));
    }
    source.push(')');
    source
}

/// Inferred `(column_name, column_type)` pairs of a CSV file.
pub fn describe_csv(conn: &Connection, path: &Path) -> Result<Vec<(String, String)>> {
    let query = format!("DESCRIBE SELECT * FROM {}", csv_source(path, None));
    let mut stmt = conn.prepare(&query)?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;

    let mut columns = Vec::new();
    for row in rows {
        columns.push(row?);
    }
    Ok(columns)
}

/// Validate a CSV file against `schema` and materialise it as a table.
///
/// Returns the number of rows loaded.
pub fn load_table(conn: &Connection, path: &Path, schema: &InputSchema) -> Result<usize> {
    if !path.is_file() {
        return Err(Error::MissingInput(path.to_path_buf()));
    }

    let inferred = describe_csv(conn, path)?;
    debug!("Inferred schema for {}: {:?}", schema.table, inferred);
    schema.validate(&inferred)?;

    let query = format!(
        "CREATE OR REPLACE TABLE {} AS SELECT * FROM {}",
        schema.table,
        csv_source(path, Some(schema))
    );
    debug!("{}", query);
    conn.execute_batch(&query)?;

    let mut stmt = conn.prepare(&format!("SELECT COUNT(*) FROM {}", schema.table))?;
    let count: i64 = stmt.query_row([], |row| row.get(0))?;
    Ok(usize::try_from(count).unwrap_or_default())
}

/// Read the loaded listening log, one event per row.
pub fn select_listening_events(conn: &Connection) -> Result<Vec<ListeningEvent>> {
    let query = format!(
        r#"
        SELECT
            CAST("user_id" AS VARCHAR),
            CAST("song_id" AS VARCHAR),
            CAST("timestamp" AS VARCHAR),
            CAST("duration_sec" AS DOUBLE)
        FROM {}
        "#,
        LISTENING_LOGS.table
    );

    let mut stmt = conn.prepare(&query)?;
    let rows = stmt.query_map([], |row| {
        Ok(ListeningEvent {
            user_id: row.get(0)?,
            song_id: row.get(1)?,
            timestamp: row.get(2)?,
            duration_sec: row.get(3)?,
        })
    })?;

    let mut events = Vec::new();
    for row in rows {
        events.push(row?);
    }

    let unattributed = events.iter().filter(|e| e.user_id.is_none()).count();
    if unattributed > 0 {
        debug!("{} listening events without a user_id", unattributed);
    }
    Ok(events)
}

/// Read the loaded song catalog.
///
/// Songs without an id can never be joined and are skipped.
pub fn select_songs(conn: &Connection) -> Result<Vec<Song>> {
    let query = format!(
        r#"
        SELECT
            CAST("song_id" AS VARCHAR),
            CAST("title" AS VARCHAR),
            CAST("artist" AS VARCHAR),
            CAST("genre" AS VARCHAR)
        FROM {}
        WHERE "song_id" IS NOT NULL
        "#,
        SONGS_METADATA.table
    );

    let mut stmt = conn.prepare(&query)?;
    let rows = stmt.query_map([], |row| {
        Ok(Song {
            song_id: row.get(0)?,
            title: row.get(1)?,
            artist: row.get(2)?,
            genre: row.get(3)?,
        })
    })?;

    let mut songs = Vec::new();
    for row in rows {
        songs.push(row?);
    }
    Ok(songs)
}
