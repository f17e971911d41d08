//! # Music Analysis
//!
//! Batch analytics over a music streaming event log joined with a song catalog.
//!
//! This crate provides:
//! - DuckDB-backed CSV ingest with schema validation
//! - Favorite genre per listener (ties broken alphabetically)
//! - Average listen duration per song
//! - Genre loyalty scores (favorite-genre share of all plays)
//! - Night-owl detection (plays between midnight and 5 AM)
//! - Headered CSV export of every result set
//!
//! The stages live in [`analytics`] as plain functions over in-memory
//! relations; [`pipeline::run`] wires them to the inputs and outputs.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod analytics;
pub mod config;
pub mod db;
pub mod display;
pub mod error;
pub mod pipeline;
pub mod records;
pub mod types;

pub use config::Config;
pub use db::Session;
pub use error::{Error, Result};
pub use pipeline::{run, RunReport};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "music-analysis";
