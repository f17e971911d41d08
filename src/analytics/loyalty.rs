//! Genre loyalty scoring

use tracing::debug;

use super::genre::UserFavoriteGenre;
use super::totals::UserTotals;
use crate::types::PlayCount;

/// Default inclusive upper bound on the loyalty score.
pub const DEFAULT_LOYALTY_THRESHOLD: f64 = 0.75;

/// Share of a user's plays that went to their favorite genre.
#[derive(Debug, Clone, PartialEq)]
pub struct GenreLoyalty {
    pub user_id: String,
    pub favorite_genre: Option<String>,
    pub play_count: PlayCount,
    pub total_plays: PlayCount,
    pub loyalty_score: f64,
}

/// Join favorites with totals and keep users scoring at most `threshold`.
///
/// Users whose favorite genre dominates above the threshold are dropped, so
/// the result lists listeners with some genre diversity. The favorite row of
/// events without a user never matches a total and is dropped as well.
pub fn loyalty_scores(
    favorites: &[UserFavoriteGenre],
    totals: &UserTotals,
    threshold: f64,
) -> Vec<GenreLoyalty> {
    let scores: Vec<GenreLoyalty> = favorites
        .iter()
        .filter_map(|favorite| {
            let user_id = favorite.user_id.as_deref()?;
            let total_plays = totals.get(user_id)?;
            let loyalty_score = favorite.play_count.share_of(total_plays)?;
            Some(GenreLoyalty {
                user_id: user_id.to_string(),
                favorite_genre: favorite.favorite_genre.clone(),
                play_count: favorite.play_count,
                total_plays,
                loyalty_score,
            })
        })
        .filter(|row| row.loyalty_score <= threshold)
        .collect();

    debug!(
        "{} of {} users at or below loyalty threshold {}",
        scores.len(),
        favorites.len(),
        threshold
    );
    scores
}
