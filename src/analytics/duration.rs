//! Average listen duration per song

use std::collections::HashMap;

use rayon::prelude::*;

use crate::records::{Catalog, ListeningEvent};

/// Mean listen time of one song, with its catalog attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct SongAverageDuration {
    pub song_id: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
    /// `None` when every event of the song has an empty duration.
    pub avg_duration_sec: Option<f64>,
}

/// Group events by `song_id`, average their durations and attach title/artist.
///
/// Every song id seen in the log gets exactly one row, matched or not.
/// Output is sorted by `song_id`, missing id first.
pub fn average_durations(events: &[ListeningEvent], catalog: &Catalog) -> Vec<SongAverageDuration> {
    // Durations are summed in event order so reruns produce identical floats.
    let mut by_song: HashMap<Option<&str>, Vec<f64>> = HashMap::new();
    for event in events {
        let durations = by_song.entry(event.song_id.as_deref()).or_default();
        durations.extend(event.duration_sec);
    }

    let mut rows: Vec<SongAverageDuration> = by_song
        .into_par_iter()
        .map(|(song_id, durations)| {
            let song = catalog.get(song_id);
            SongAverageDuration {
                song_id: song_id.map(str::to_string),
                title: song.and_then(|s| s.title.clone()),
                artist: song.and_then(|s| s.artist.clone()),
                avg_duration_sec: mean(&durations),
            }
        })
        .collect();

    rows.sort_by(|a, b| a.song_id.cmp(&b.song_id));
    rows
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
