//! Analytics over the listening log
//!
//! Each stage is a plain function from input relations to one output relation:
//!
//! - [`genre`] - genre join and favorite-genre ranking
//! - [`duration`] - average listen duration per song
//! - [`totals`] - total plays per user, shared by the two stages below
//! - [`loyalty`] - favorite-genre share of total plays
//! - [`night_owl`] - users with plays in the night window
//!
//! [`analyze`] materialises the shared relations once and runs the
//! independent stages concurrently on the rayon pool.

pub mod duration;
pub mod genre;
pub mod loyalty;
pub mod night_owl;
pub mod totals;

pub use duration::SongAverageDuration;
pub use genre::{UserFavoriteGenre, UserGenrePlayCount};
pub use loyalty::GenreLoyalty;
pub use night_owl::{NightOwl, NightWindow};
pub use totals::UserTotals;

use tracing::{debug, info};

use crate::config::AnalysisConfig;
use crate::records::{Catalog, ListeningEvent};

/// Tunable parameters of the stages.
#[derive(Debug, Clone)]
pub struct AnalysisParams {
    pub loyalty_threshold: f64,
    pub night_window: NightWindow,
    pub timestamp_format: String,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            loyalty_threshold: loyalty::DEFAULT_LOYALTY_THRESHOLD,
            night_window: NightWindow::default(),
            timestamp_format: night_owl::DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

impl From<&AnalysisConfig> for AnalysisParams {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            loyalty_threshold: config.loyalty_threshold,
            night_window: NightWindow::new(config.night_start_hour, config.night_end_hour),
            timestamp_format: config.timestamp_format.clone(),
        }
    }
}

/// The four result sets of one run.
#[derive(Debug, Clone, Default)]
pub struct AnalysisResults {
    pub favorite_genres: Vec<UserFavoriteGenre>,
    pub avg_durations: Vec<SongAverageDuration>,
    pub genre_loyalty: Vec<GenreLoyalty>,
    pub night_owls: Vec<NightOwl>,
}

/// Run every stage over the inputs.
pub fn analyze(
    events: &[ListeningEvent],
    catalog: &Catalog,
    params: &AnalysisParams,
) -> AnalysisResults {
    let ((favorite_genres, totals), avg_durations) = rayon::join(
        || {
            rayon::join(
                || genre::favorite_genres(&genre::join_genres(events, catalog)),
                || UserTotals::from_events(events),
            )
        },
        || duration::average_durations(events, catalog),
    );
    info!(
        "Favorite genres for {} users, average durations for {} songs",
        favorite_genres.len(),
        avg_durations.len()
    );
    if !totals.unattributed().is_zero() {
        debug!("{} plays without a user_id", totals.unattributed());
    }

    let (genre_loyalty, night_owls) = rayon::join(
        || loyalty::loyalty_scores(&favorite_genres, &totals, params.loyalty_threshold),
        || {
            night_owl::night_owls(
                events,
                &totals,
                params.night_window,
                &params.timestamp_format,
            )
        },
    );
    info!(
        "{} users within loyalty threshold, {} night owls",
        genre_loyalty.len(),
        night_owls.len()
    );

    AnalysisResults {
        favorite_genres,
        avg_durations,
        genre_loyalty,
        night_owls,
    }
}
