//! Result-set export: typed rows to headered CSV files via DuckDB

use std::path::{Path, PathBuf};

use duckdb::{params, Connection, Statement};
use tracing::debug;

use crate::analytics::{GenreLoyalty, NightOwl, SongAverageDuration, UserFavoriteGenre};
use crate::error::Result;

use super::queries::sql_literal;

/// A row type that can be written as one of the output tables.
pub trait ResultRow: Send + Sync + 'static {
    /// Result set name, also the output file stem
    const NAME: &'static str;

    /// Output columns as `(name, duckdb type)`, in file order
    const COLUMNS: &'static [(&'static str, &'static str)];

    /// Bind this row to the table's INSERT statement and run it.
    fn insert(&self, stmt: &mut Statement<'_>) -> duckdb::Result<usize>;
}

impl ResultRow for UserFavoriteGenre {
    const NAME: &'static str = "user_favorite_genres";
    const COLUMNS: &'static [(&'static str, &'static str)] = &[
        ("user_id", "VARCHAR"),
        ("favorite_genre", "VARCHAR"),
        ("play_count", "BIGINT"),
    ];

    fn insert(&self, stmt: &mut Statement<'_>) -> duckdb::Result<usize> {
        stmt.execute(params![self.user_id, self.favorite_genre, self.play_count.get()])
    }
}

impl ResultRow for SongAverageDuration {
    const NAME: &'static str = "avg_listen_time_per_song";
    const COLUMNS: &'static [(&'static str, &'static str)] = &[
        ("song_id", "VARCHAR"),
        ("title", "VARCHAR"),
        ("artist", "VARCHAR"),
        ("avg_duration_sec", "DOUBLE"),
    ];

    fn insert(&self, stmt: &mut Statement<'_>) -> duckdb::Result<usize> {
        stmt.execute(params![self.song_id, self.title, self.artist, self.avg_duration_sec])
    }
}

impl ResultRow for GenreLoyalty {
    const NAME: &'static str = "genre_loyalty_scores";
    const COLUMNS: &'static [(&'static str, &'static str)] = &[
        ("user_id", "VARCHAR"),
        ("favorite_genre", "VARCHAR"),
        ("play_count", "BIGINT"),
        ("total_plays", "BIGINT"),
        ("loyalty_score", "DOUBLE"),
    ];

    fn insert(&self, stmt: &mut Statement<'_>) -> duckdb::Result<usize> {
        stmt.execute(params![
            self.user_id,
            self.favorite_genre,
            self.play_count.get(),
            self.total_plays.get(),
            self.loyalty_score,
        ])
    }
}

impl ResultRow for NightOwl {
    const NAME: &'static str = "night_owl_users";
    const COLUMNS: &'static [(&'static str, &'static str)] = &[
        ("user_id", "VARCHAR"),
        ("night_plays", "BIGINT"),
        ("total_plays", "BIGINT"),
        ("night_play_ratio", "DOUBLE"),
    ];

    fn insert(&self, stmt: &mut Statement<'_>) -> duckdb::Result<usize> {
        stmt.execute(params![
            self.user_id,
            self.night_plays.get(),
            self.total_plays.get(),
            self.night_play_ratio,
        ])
    }
}

/// Output file of a result set inside `dir`.
pub fn output_path<R: ResultRow>(dir: &Path) -> PathBuf {
    dir.join(format!("{}.csv", R::NAME))
}

fn create_table_sql<R: ResultRow>() -> String {
    let columns: Vec<String> = R::COLUMNS
        .iter()
        .map(|(name, ty)| format!("\"{name}\" {ty}"))
        .collect();
    format!(
        "CREATE OR REPLACE TEMP TABLE {} ({})",
        R::NAME,
        columns.join(", ")
    )
}

fn insert_sql<R: ResultRow>() -> String {
    let placeholders = vec!["?"; R::COLUMNS.len()].join(", ");
    format!("INSERT INTO {} VALUES ({})", R::NAME, placeholders)
}

/// Write `rows` to `path` as CSV with a header row, replacing any prior file.
///
/// Rows are staged in a connection-local temporary table, so concurrent
/// writers on cloned connections never see each other's tables.
pub fn write_result_set<R: ResultRow>(
    conn: &mut Connection,
    rows: &[R],
    path: &Path,
) -> Result<usize> {
    conn.execute_batch(&create_table_sql::<R>())?;

    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(&insert_sql::<R>())?;
        for row in rows {
            row.insert(&mut stmt)?;
        }
    }
    tx.commit()?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    if path.exists() {
        std::fs::remove_file(path)?;
    }

    let copy = format!(
        "COPY {} TO {} (FORMAT CSV, HEADER, DELIMITER ',')",
        R::NAME,
        sql_literal(&path.to_string_lossy())
    );
    debug!("{}", copy);
    conn.execute_batch(&copy)?;
    conn.execute_batch(&format!("DROP TABLE {}", R::NAME))?;

    Ok(rows.len())
}
