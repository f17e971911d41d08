//! End-to-end run: load inputs, compute the four result sets, write them out

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::analytics::{self, AnalysisParams, AnalysisResults};
use crate::config::Config;
use crate::db::{output_path, write_result_set, ResultRow, Session};
use crate::error::{Error, Result};

/// One written result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSummary {
    pub name: String,
    pub path: PathBuf,
    pub rows: usize,
}

/// What a run read and wrote.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    pub listening_events: usize,
    pub catalog_songs: usize,
    pub outputs: Vec<OutputSummary>,
}

/// Run the pipeline with the locations and parameters in `config`.
///
/// A schema problem in either input aborts before anything is written.
/// The four result sets are then written concurrently; a failed write
/// leaves the other files in place and the first failure is returned.
pub async fn run(config: &Config) -> Result<RunReport> {
    run_with_preview(config, |_| {}).await
}

/// Like [`run`], calling `inspect` on the results before they are written.
pub async fn run_with_preview<F>(config: &Config, inspect: F) -> Result<RunReport>
where
    F: FnOnce(&AnalysisResults),
{
    let started = Instant::now();
    let session = Session::open()?;

    let events = session.load_listening_events(&config.input.listening_logs)?;
    let catalog = session.load_catalog(&config.input.songs_metadata)?;
    let mut report = RunReport {
        listening_events: events.len(),
        catalog_songs: catalog.len(),
        outputs: Vec::new(),
    };

    let params = AnalysisParams::from(&config.analysis);
    let results =
        tokio::task::spawn_blocking(move || analytics::analyze(&events, &catalog, &params))
            .await?;
    inspect(&results);

    report.outputs = write_all(&session, results, &config.output.dir).await?;
    session.close()?;

    info!(
        "Pipeline finished in {}",
        humantime::format_duration(std::time::Duration::from_millis(
            u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
        ))
    );
    Ok(report)
}

async fn write_all(
    session: &Session,
    results: AnalysisResults,
    dir: &Path,
) -> Result<Vec<OutputSummary>> {
    let AnalysisResults {
        favorite_genres,
        avg_durations,
        genre_loyalty,
        night_owls,
    } = results;

    let (favorites, durations, loyalty, owls) = tokio::join!(
        spawn_write(session.handle()?, favorite_genres, dir),
        spawn_write(session.handle()?, avg_durations, dir),
        spawn_write(session.handle()?, genre_loyalty, dir),
        spawn_write(session.handle()?, night_owls, dir),
    );

    let mut outputs = Vec::with_capacity(4);
    let mut first_error = None;
    for outcome in [favorites, durations, loyalty, owls] {
        match outcome {
            Ok(summary) => {
                info!(
                    "Wrote {} rows to {}",
                    summary.rows,
                    summary.path.display()
                );
                outputs.push(summary);
            }
            Err(err) => {
                error!("{}", err);
                first_error.get_or_insert(err);
            }
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(outputs),
    }
}

async fn spawn_write<R: ResultRow>(
    mut conn: duckdb::Connection,
    rows: Vec<R>,
    dir: &Path,
) -> Result<OutputSummary> {
    let path = output_path::<R>(dir);
    let target = path.clone();
    let written = tokio::task::spawn_blocking(move || write_result_set(&mut conn, &rows, &target))
        .await
        .map_err(|err| Error::output(R::NAME, err.into()))?
        .map_err(|err| Error::output(R::NAME, err))?;

    Ok(OutputSummary {
        name: R::NAME.to_string(),
        path,
        rows: written,
    })
}
