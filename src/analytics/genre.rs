//! Genre join and favorite-genre ranking

use std::cmp::Ordering;
use std::collections::HashMap;

use rayon::prelude::*;

use crate::records::{Catalog, ListeningEvent};
use crate::types::PlayCount;

/// A listening event enriched with its song's genre.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenreEvent<'a> {
    pub user_id: Option<&'a str>,
    pub genre: Option<&'a str>,
}

/// Plays of one genre by one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserGenrePlayCount {
    pub user_id: Option<String>,
    pub genre: Option<String>,
    pub play_count: PlayCount,
}

/// The top genre of a user.
///
/// Events without a user are ranked together under a `None` id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFavoriteGenre {
    pub user_id: Option<String>,
    pub favorite_genre: Option<String>,
    pub play_count: PlayCount,
}

/// Left-join events against the catalog on `song_id`.
///
/// Produces exactly one row per event, in input order. Unmatched events
/// carry a `None` genre.
pub fn join_genres<'a>(events: &'a [ListeningEvent], catalog: &'a Catalog) -> Vec<GenreEvent<'a>> {
    events
        .par_iter()
        .map(|event| GenreEvent {
            user_id: event.user_id.as_deref(),
            genre: catalog
                .get(event.song_id.as_deref())
                .and_then(|song| song.genre.as_deref()),
        })
        .collect()
}

/// Count plays per (user, genre) pair.
pub fn count_user_genres(joined: &[GenreEvent<'_>]) -> Vec<UserGenrePlayCount> {
    let counts = joined
        .par_iter()
        .fold(HashMap::<(Option<&str>, Option<&str>), PlayCount>::new, |mut acc, row| {
            *acc.entry((row.user_id, row.genre)).or_default() += PlayCount::ONE;
            acc
        })
        .reduce(HashMap::new, merge_counts);

    counts
        .into_iter()
        .map(|((user_id, genre), play_count)| UserGenrePlayCount {
            user_id: user_id.map(str::to_string),
            genre: genre.map(str::to_string),
            play_count,
        })
        .collect()
}

/// Ranking order within a user: most plays first, then genre name ascending.
///
/// A missing genre sorts before every named genre.
pub fn favorite_order(a: &UserGenrePlayCount, b: &UserGenrePlayCount) -> Ordering {
    b.play_count
        .cmp(&a.play_count)
        .then_with(|| a.genre.cmp(&b.genre))
}

/// Pick the rank-1 genre of every user. Output is sorted by `user_id`,
/// missing id first.
pub fn rank_favorite_genres(counts: Vec<UserGenrePlayCount>) -> Vec<UserFavoriteGenre> {
    let mut by_user: HashMap<Option<String>, Vec<UserGenrePlayCount>> = HashMap::new();
    for row in counts {
        by_user.entry(row.user_id.clone()).or_default().push(row);
    }

    let mut favorites: Vec<UserFavoriteGenre> = by_user
        .into_par_iter()
        .filter_map(|(_, mut genres)| {
            genres.sort_by(favorite_order);
            genres.into_iter().next().map(|top| UserFavoriteGenre {
                user_id: top.user_id,
                favorite_genre: top.genre,
                play_count: top.play_count,
            })
        })
        .collect();

    favorites.sort_by(|a, b| a.user_id.cmp(&b.user_id));
    favorites
}

/// Genre join followed by ranking.
pub fn favorite_genres(joined: &[GenreEvent<'_>]) -> Vec<UserFavoriteGenre> {
    rank_favorite_genres(count_user_genres(joined))
}

pub(crate) fn merge_counts<K: std::hash::Hash + Eq>(
    mut left: HashMap<K, PlayCount>,
    right: HashMap<K, PlayCount>,
) -> HashMap<K, PlayCount> {
    for (key, count) in right {
        *left.entry(key).or_default() += count;
    }
    left
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Song;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Song::new("r1", "Rock One", "Band", "rock"),
            Song::new("r2", "Rock Two", "Band", "rock"),
            Song::new("p1", "Pop One", "Singer", "pop"),
            Song::new("j1", "Jazz One", "Trio", "jazz"),
        ])
    }

    fn play(user: &str, song: &str) -> ListeningEvent {
        ListeningEvent::new(user, song, "2024-01-01 12:00:00", 180.0)
    }

    #[test]
    fn test_join_preserves_every_event() {
        let catalog = catalog();
        let mut events = vec![play("u1", "r1"), play("u1", "missing"), play("u2", "p1")];
        events.push(ListeningEvent {
            song_id: None,
            ..play("u3", "r1")
        });

        let joined = join_genres(&events, &catalog);
        assert_eq!(joined.len(), events.len());
        assert_eq!(joined[0].genre, Some("rock"));
        assert_eq!(joined[1].genre, None);
        assert_eq!(joined[2].genre, Some("pop"));
        assert_eq!(joined[3].genre, None);
        assert_eq!(joined[3].user_id, Some("u3"));
    }

    #[test]
    fn test_counts_per_user_and_genre() {
        let catalog = catalog();
        let events = vec![play("u1", "r1"), play("u1", "r2"), play("u1", "p1")];
        let joined = join_genres(&events, &catalog);

        let mut counts = count_user_genres(&joined);
        counts.sort_by(|a, b| a.genre.cmp(&b.genre));

        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].genre.as_deref(), Some("pop"));
        assert_eq!(counts[0].play_count, PlayCount::new(1));
        assert_eq!(counts[1].genre.as_deref(), Some("rock"));
        assert_eq!(counts[1].play_count, PlayCount::new(2));
    }

    #[test]
    fn test_favorite_is_most_played() {
        let catalog = catalog();
        let events = vec![
            play("u1", "j1"),
            play("u1", "r1"),
            play("u1", "r2"),
            play("u2", "p1"),
        ];
        let favorites = favorite_genres(&join_genres(&events, &catalog));

        assert_eq!(favorites.len(), 2);
        assert_eq!(favorites[0].user_id.as_deref(), Some("u1"));
        assert_eq!(favorites[0].favorite_genre.as_deref(), Some("rock"));
        assert_eq!(favorites[0].play_count, PlayCount::new(2));
        assert_eq!(favorites[1].user_id.as_deref(), Some("u2"));
        assert_eq!(favorites[1].favorite_genre.as_deref(), Some("pop"));
    }

    #[test]
    fn test_tie_resolves_to_smallest_genre_name() {
        let catalog = catalog();
        let events = vec![
            play("u1", "r1"),
            play("u1", "r2"),
            play("u1", "r1"),
            play("u1", "p1"),
            play("u1", "p1"),
            play("u1", "p1"),
        ];
        let favorites = favorite_genres(&join_genres(&events, &catalog));

        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].favorite_genre.as_deref(), Some("pop"));
        assert_eq!(favorites[0].play_count, PlayCount::new(3));
    }

    #[test]
    fn test_user_without_catalog_matches_gets_null_favorite() {
        let catalog = catalog();
        let events = vec![play("u9", "nope"), play("u9", "also-nope")];
        let favorites = favorite_genres(&join_genres(&events, &catalog));

        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].favorite_genre, None);
        assert_eq!(favorites[0].play_count, PlayCount::new(2));
    }

    #[test]
    fn test_null_genre_wins_tie() {
        let catalog = catalog();
        let events = vec![play("u1", "nope"), play("u1", "j1")];
        let favorites = favorite_genres(&join_genres(&events, &catalog));

        assert_eq!(favorites[0].favorite_genre, None);
        assert_eq!(favorites[0].play_count, PlayCount::new(1));
    }

    #[test]
    fn test_events_without_user_form_one_group() {
        let catalog = catalog();
        let anonymous = |song: &str| ListeningEvent {
            user_id: None,
            ..play("", song)
        };
        let events = vec![
            play("u1", "p1"),
            anonymous("r1"),
            anonymous("r2"),
            anonymous("p1"),
        ];

        let joined = join_genres(&events, &catalog);
        assert_eq!(joined.len(), 4);
        assert_eq!(joined[1].user_id, None);

        let favorites = favorite_genres(&joined);
        assert_eq!(favorites.len(), 2);
        assert_eq!(favorites[0].user_id, None);
        assert_eq!(favorites[0].favorite_genre.as_deref(), Some("rock"));
        assert_eq!(favorites[0].play_count, PlayCount::new(2));
        assert_eq!(favorites[1].user_id.as_deref(), Some("u1"));
    }

    #[test]
    fn test_favorite_order_comparator() {
        let row = |genre: &str, plays: i64| UserGenrePlayCount {
            user_id: Some("u1".to_string()),
            genre: Some(genre.to_string()),
            play_count: PlayCount::new(plays),
        };

        assert_eq!(favorite_order(&row("rock", 5), &row("pop", 3)), Ordering::Less);
        assert_eq!(favorite_order(&row("rock", 3), &row("pop", 3)), Ordering::Greater);
        assert_eq!(favorite_order(&row("pop", 3), &row("pop", 3)), Ordering::Equal);
    }
}
