//! Display utilities for formatting analysis output.
//!
//! This module provides the terminal rendering used by the CLI:
//!
//! - [`truncate`] - Truncate strings to a maximum length with ellipsis
//! - [`make_bar`] - Create visual bar charts for ratios
//! - [`print_section`] - Print section headers
//! - [`display_results`] - Preview the four result sets
//! - [`display_report`] - Summarise what a run read and wrote

use crate::analytics::{
    AnalysisResults, GenreLoyalty, NightOwl, SongAverageDuration, UserFavoriteGenre,
};
use crate::pipeline::RunReport;

const NULL: &str = "-";

/// Truncate a string to a maximum length, adding "..." if truncated.
///
/// Handles Unicode characters correctly by counting chars rather than bytes.
/// For `max_len < 3`, truncates without ellipsis since there's no room for "...".
///
/// # Examples
///
/// ```
/// use music_analysis::display::truncate;
///
/// assert_eq!(truncate("hello", 10), "hello");
/// assert_eq!(truncate("hello world", 8), "hello...");
/// assert_eq!(truncate("hello", 2), "he");
/// ```
#[must_use]
pub fn truncate(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        s.to_string()
    } else if max_len < 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{truncated}...")
    }
}

/// Create a visual bar for a ratio in `[0, 1]`.
///
/// Values outside the range are clamped.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn make_bar(ratio: f64, width: usize) -> String {
    if !ratio.is_finite() || ratio <= 0.0 {
        return "░".repeat(width);
    }
    let filled = (ratio.clamp(0.0, 1.0) * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Print a section header with equals signs.
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("  {title}");
    println!("{}", "=".repeat(60));
}

fn or_null(value: Option<&str>) -> &str {
    value.unwrap_or(NULL)
}

/// Show the first `limit` favorite genres.
pub fn display_favorite_genres(rows: &[UserFavoriteGenre], limit: usize) {
    for row in rows.iter().take(limit) {
        println!(
            "  {:<20} {:<20} {:>6} plays",
            truncate(or_null(row.user_id.as_deref()), 20),
            truncate(or_null(row.favorite_genre.as_deref()), 20),
            row.play_count
        );
    }
}

/// Show the first `limit` per-song averages.
pub fn display_avg_durations(rows: &[SongAverageDuration], limit: usize) {
    for row in rows.iter().take(limit) {
        let avg = row
            .avg_duration_sec
            .map_or_else(|| NULL.to_string(), |secs| format!("{secs:.1}s"));
        println!(
            "  {:<12} {:<22} {:<16} {:>9}",
            truncate(or_null(row.song_id.as_deref()), 12),
            truncate(or_null(row.title.as_deref()), 22),
            truncate(or_null(row.artist.as_deref()), 16),
            avg
        );
    }
}

/// Show the first `limit` loyalty scores.
pub fn display_genre_loyalty(rows: &[GenreLoyalty], limit: usize) {
    for row in rows.iter().take(limit) {
        println!(
            "  {:<16} {:<14} {} {:>4}/{:<4} {:.2}",
            truncate(&row.user_id, 16),
            truncate(or_null(row.favorite_genre.as_deref()), 14),
            make_bar(row.loyalty_score, 15),
            row.play_count,
            row.total_plays,
            row.loyalty_score
        );
    }
}

/// Show the first `limit` night owls.
pub fn display_night_owls(rows: &[NightOwl], limit: usize) {
    for row in rows.iter().take(limit) {
        println!(
            "  {:<20} {} {:>4}/{:<4} {:.2}",
            truncate(&row.user_id, 20),
            make_bar(row.night_play_ratio, 20),
            row.night_plays,
            row.total_plays,
            row.night_play_ratio
        );
    }
}

/// Preview every result set.
pub fn display_results(results: &AnalysisResults, limit: usize) {
    print_section(&format!(
        "FAVORITE GENRES ({} users)",
        results.favorite_genres.len()
    ));
    display_favorite_genres(&results.favorite_genres, limit);

    print_section(&format!(
        "AVERAGE LISTEN TIME ({} songs)",
        results.avg_durations.len()
    ));
    display_avg_durations(&results.avg_durations, limit);

    print_section(&format!(
        "GENRE LOYALTY ({} users)",
        results.genre_loyalty.len()
    ));
    display_genre_loyalty(&results.genre_loyalty, limit);

    print_section(&format!("NIGHT OWLS ({} users)", results.night_owls.len()));
    display_night_owls(&results.night_owls, limit);
}

/// Summarise a finished run.
pub fn display_report(report: &RunReport) {
    print_section("RUN SUMMARY");
    println!("  Listening events: {:>10}", report.listening_events);
    println!("  Catalog songs:    {:>10}", report.catalog_songs);
    for output in &report.outputs {
        println!(
            "  {:<26} {:>8} rows  {}",
            output.name,
            output.rows,
            output.path.display()
        );
    }
}
