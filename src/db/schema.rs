//! Input table schemas and validation of inferred CSV schemas

use crate::error::{Error, Result};

/// Required type class of an input column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Any inferred type; read back as text.
    Text,
    /// Must infer to an integer, decimal or floating type.
    Numeric,
}

/// A required input column.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

const fn text(name: &'static str) -> Column {
    Column {
        name,
        kind: ColumnKind::Text,
    }
}

const fn numeric(name: &'static str) -> Column {
    Column {
        name,
        kind: ColumnKind::Numeric,
    }
}

/// Schema every input file must satisfy before anything is computed.
#[derive(Debug, Clone, Copy)]
pub struct InputSchema {
    /// Table the file is loaded into
    pub table: &'static str,
    /// Required columns; extra columns are ignored
    pub columns: &'static [Column],
    /// Columns loaded as VARCHAR regardless of what inference would pick
    pub raw_text: &'static [&'static str],
}

/// The listening event log
pub const LISTENING_LOGS: InputSchema = InputSchema {
    table: "listening_logs",
    columns: &[
        text("user_id"),
        text("song_id"),
        text("timestamp"),
        numeric("duration_sec"),
    ],
    raw_text: &["timestamp"],
};

/// The song catalog
pub const SONGS_METADATA: InputSchema = InputSchema {
    table: "songs_metadata",
    columns: &[text("song_id"), text("title"), text("artist"), text("genre")],
    raw_text: &[],
};

const NUMERIC_TYPES: &[&str] = &[
    "TINYINT",
    "SMALLINT",
    "INTEGER",
    "BIGINT",
    "HUGEINT",
    "UTINYINT",
    "USMALLINT",
    "UINTEGER",
    "UBIGINT",
    "UHUGEINT",
    "FLOAT",
    "DOUBLE",
];

/// Whether a DuckDB type name is numeric.
pub fn is_numeric_type(type_name: &str) -> bool {
    let upper = type_name.trim().to_ascii_uppercase();
    upper.starts_with("DECIMAL") || NUMERIC_TYPES.contains(&upper.as_str())
}

impl InputSchema {
    /// Check inferred `(column_name, column_type)` pairs against this schema.
    ///
    /// Column names match case-insensitively.
    pub fn validate(&self, inferred: &[(String, String)]) -> Result<()> {
        for column in self.columns {
            let found = inferred
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(column.name));

            let Some((_, type_name)) = found else {
                let available: Vec<&str> = inferred.iter().map(|(n, _)| n.as_str()).collect();
                return Err(Error::schema(
                    self.table,
                    format!(
                        "missing required column '{}' (found: {})",
                        column.name,
                        available.join(", ")
                    ),
                ));
            };

            if column.kind == ColumnKind::Numeric && !is_numeric_type(type_name) {
                return Err(Error::schema(
                    self.table,
                    format!(
                        "column '{}' must be numeric, inferred {}",
                        column.name, type_name
                    ),
                ));
            }
        }

        Ok(())
    }

    /// Value of the `types` option for `read_csv_auto`, if any column is forced to text.
    pub fn type_overrides(&self) -> Option<String> {
        if self.raw_text.is_empty() {
            return None;
        }
        let entries: Vec<String> = self
            .raw_text
            .iter()
            .map(|name| format!("'{name}': 'VARCHAR'"))
            .collect();
        Some(format!("{{{}}}", entries.join(", ")))
    }
}
