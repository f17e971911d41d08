//! Input records: listening events and the song catalog

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::warn;

/// One recorded play of a song by a user.
#[derive(Debug, Clone, PartialEq)]
pub struct ListeningEvent {
    /// Listener; `None` when the source cell was empty.
    pub user_id: Option<String>,
    /// Catalog key; `None` when the source cell was empty.
    pub song_id: Option<String>,
    /// Raw timestamp text, parsed only by the night-owl stage.
    pub timestamp: Option<String>,
    pub duration_sec: Option<f64>,
}

impl ListeningEvent {
    /// Convenience constructor for fully populated events.
    #[must_use]
    pub fn new(user_id: &str, song_id: &str, timestamp: &str, duration_sec: f64) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            song_id: Some(song_id.to_string()),
            timestamp: Some(timestamp.to_string()),
            duration_sec: Some(duration_sec),
        }
    }
}

/// A song in the reference catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    pub song_id: String,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub genre: Option<String>,
}

impl Song {
    #[must_use]
    pub fn new(song_id: &str, title: &str, artist: &str, genre: &str) -> Self {
        Self {
            song_id: song_id.to_string(),
            title: Some(title.to_string()),
            artist: Some(artist.to_string()),
            genre: Some(genre.to_string()),
        }
    }
}

/// Song catalog indexed by `song_id`.
///
/// Lookups never fan out: each key maps to exactly one song.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    songs: HashMap<String, Song>,
}

impl Catalog {
    /// Index songs by id. The first row wins for a duplicated id.
    #[must_use]
    pub fn new(songs: Vec<Song>) -> Self {
        let mut index = HashMap::with_capacity(songs.len());
        let mut duplicates = 0usize;

        for song in songs {
            match index.entry(song.song_id.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(song);
                }
                Entry::Occupied(_) => duplicates += 1,
            }
        }

        if duplicates > 0 {
            warn!("Catalog has {} duplicate song_id rows; kept the first of each", duplicates);
        }

        Self { songs: index }
    }

    /// Look up a song. A missing key never matches.
    #[must_use]
    pub fn get(&self, song_id: Option<&str>) -> Option<&Song> {
        song_id.and_then(|id| self.songs.get(id))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}
