//! Night-owl detection: users with plays between midnight and 5 AM

use std::collections::HashMap;

use chrono::{NaiveDateTime, Timelike};
use rayon::prelude::*;
use tracing::debug;

use super::genre::merge_counts;
use super::totals::UserTotals;
use crate::records::ListeningEvent;
use crate::types::PlayCount;

/// Default timestamp layout of the event log.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Half-open range of hours `[start_hour, end_hour)` counted as night.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NightWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Default for NightWindow {
    fn default() -> Self {
        Self {
            start_hour: 0,
            end_hour: 5,
        }
    }
}

impl NightWindow {
    #[must_use]
    pub const fn new(start_hour: u32, end_hour: u32) -> Self {
        Self {
            start_hour,
            end_hour,
        }
    }

    #[must_use]
    pub const fn contains(self, hour: u32) -> bool {
        hour >= self.start_hour && hour < self.end_hour
    }
}

/// A user with at least one night play.
#[derive(Debug, Clone, PartialEq)]
pub struct NightOwl {
    pub user_id: String,
    pub night_plays: PlayCount,
    pub total_plays: PlayCount,
    pub night_play_ratio: f64,
}

/// Parse an event timestamp; `None` if it does not match `format`.
#[must_use]
pub fn parse_timestamp(raw: &str, format: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, format).ok()
}

/// Hour of day (0-23) of an event, if its timestamp parses.
#[must_use]
pub fn event_hour(event: &ListeningEvent, format: &str) -> Option<u32> {
    event
        .timestamp
        .as_deref()
        .and_then(|raw| parse_timestamp(raw, format))
        .map(|ts| ts.hour())
}

/// Count night plays per user and relate them to total plays.
///
/// Unparseable timestamps count as neither night nor day but still belong
/// to the user's total. Events without a user have no total to relate to and
/// are left out. Output is sorted by `user_id`.
pub fn night_owls(
    events: &[ListeningEvent],
    totals: &UserTotals,
    window: NightWindow,
    format: &str,
) -> Vec<NightOwl> {
    let night_counts = events
        .par_iter()
        .filter(|event| event_hour(event, format).is_some_and(|hour| window.contains(hour)))
        .filter_map(|event| event.user_id.as_deref())
        .fold(HashMap::<&str, PlayCount>::new, |mut acc, user_id| {
            *acc.entry(user_id).or_default() += PlayCount::ONE;
            acc
        })
        .reduce(HashMap::new, merge_counts);

    let mut owls: Vec<NightOwl> = night_counts
        .into_iter()
        .filter_map(|(user_id, night_plays)| {
            let total_plays = totals.get(user_id)?;
            let night_play_ratio = night_plays.share_of(total_plays)?;
            Some(NightOwl {
                user_id: user_id.to_string(),
                night_plays,
                total_plays,
                night_play_ratio,
            })
        })
        .filter(|owl| !owl.night_plays.is_zero())
        .collect();

    owls.sort_by(|a, b| a.user_id.cmp(&b.user_id));
    debug!(
        "{} night owls in window [{}, {})",
        owls.len(),
        window.start_hour,
        window.end_hour
    );
    owls
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(user: &str, timestamp: &str) -> ListeningEvent {
        ListeningEvent::new(user, "s1", timestamp, 200.0)
    }

    fn detect(events: &[ListeningEvent]) -> Vec<NightOwl> {
        let totals = UserTotals::from_events(events);
        night_owls(events, &totals, NightWindow::default(), DEFAULT_TIMESTAMP_FORMAT)
    }

    #[test]
    fn test_parse_timestamp() {
        let ts = parse_timestamp("2024-01-01 02:30:00", DEFAULT_TIMESTAMP_FORMAT).unwrap();
        assert_eq!(ts.hour(), 2);
        assert!(parse_timestamp("2024-01-01T02:30:00", DEFAULT_TIMESTAMP_FORMAT).is_none());
        assert!(parse_timestamp("yesterday", DEFAULT_TIMESTAMP_FORMAT).is_none());
        assert!(parse_timestamp("2024-01-01", DEFAULT_TIMESTAMP_FORMAT).is_none());
        assert!(parse_timestamp(" 2024-01-01 02:30:00", DEFAULT_TIMESTAMP_FORMAT).is_none());
        assert!(parse_timestamp("2024-01-01 02:30:00 ", DEFAULT_TIMESTAMP_FORMAT).is_none());
    }

    #[test]
    fn test_window_bounds() {
        let window = NightWindow::default();
        assert!(window.contains(0));
        assert!(window.contains(4));
        assert!(!window.contains(5));
        assert!(!window.contains(23));
    }

    #[test]
    fn test_one_night_play_of_two() {
        let owls = detect(&[
            at("u2", "2024-01-01 02:30:00"),
            at("u2", "2024-01-01 14:00:00"),
        ]);

        assert_eq!(owls.len(), 1);
        assert_eq!(owls[0].user_id, "u2");
        assert_eq!(owls[0].night_plays, PlayCount::new(1));
        assert_eq!(owls[0].total_plays, PlayCount::new(2));
        assert!((owls[0].night_play_ratio - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_window_edges() {
        let owls = detect(&[
            at("u1", "2024-01-01 00:00:00"),
            at("u1", "2024-01-01 04:59:59"),
            at("u1", "2024-01-01 05:00:00"),
            at("u1", "2024-01-01 23:59:59"),
        ]);

        assert_eq!(owls[0].night_plays, PlayCount::new(2));
        assert_eq!(owls[0].total_plays, PlayCount::new(4));
    }

    #[test]
    fn test_users_without_night_plays_are_absent() {
        let owls = detect(&[
            at("day", "2024-01-01 09:00:00"),
            at("night", "2024-01-02 03:00:00"),
        ]);

        assert_eq!(owls.len(), 1);
        assert_eq!(owls[0].user_id, "night");
        assert!((owls[0].night_play_ratio - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_malformed_timestamps_only_count_toward_total() {
        let mut events = vec![
            at("u1", "2024-01-01 01:15:00"),
            at("u1", "01/01/2024 01:15"),
            at("u1", "garbage"),
        ];
        events.push(ListeningEvent {
            timestamp: None,
            ..at("u1", "")
        });

        let owls = detect(&events);
        assert_eq!(owls.len(), 1);
        assert_eq!(owls[0].night_plays, PlayCount::new(1));
        assert_eq!(owls[0].total_plays, PlayCount::new(4));
        assert!((owls[0].night_play_ratio - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_padded_timestamp_is_not_a_night_play() {
        let owls = detect(&[
            at("u1", " 2024-01-01 02:00:00"),
            at("u2", "2024-01-01 02:00:00"),
        ]);

        assert_eq!(owls.len(), 1);
        assert_eq!(owls[0].user_id, "u2");
    }

    #[test]
    fn test_night_plays_without_user_are_left_out() {
        let events = vec![
            ListeningEvent {
                user_id: None,
                ..at("", "2024-01-01 03:00:00")
            },
            at("u1", "2024-01-01 03:00:00"),
        ];

        let owls = detect(&events);
        assert_eq!(owls.len(), 1);
        assert_eq!(owls[0].user_id, "u1");
        assert_eq!(owls[0].total_plays, PlayCount::new(1));
    }

    #[test]
    fn test_custom_window() {
        let events = vec![at("u1", "2024-01-01 22:10:00"), at("u1", "2024-01-01 02:00:00")];
        let totals = UserTotals::from_events(&events);
        let owls = night_owls(&events, &totals, NightWindow::new(22, 24), DEFAULT_TIMESTAMP_FORMAT);

        assert_eq!(owls[0].night_plays, PlayCount::new(1));
    }
}
