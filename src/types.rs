//! Domain-specific newtypes for type safety.
//!
//! Play counts are kept apart from other integers so a count can never be
//! passed where a total is expected without going through [`PlayCount::share_of`].

use std::fmt;
use std::ops::AddAssign;

use derive_more::{Add as DeriveAdd, From, Into};

/// A play count value.
///
/// Represents the number of listening events attributed to a user, genre or song.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, DeriveAdd, From, Into,
)]
pub struct PlayCount(pub i64);

impl PlayCount {
    /// A single play.
    pub const ONE: Self = Self(1);

    /// Create a new instance.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the inner value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Check if the value is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Fraction of `total` this count represents.
    ///
    /// Returns `None` when `total` is zero.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn share_of(self, total: Self) -> Option<f64> {
        if total.is_zero() {
            None
        } else {
            Some(self.0 as f64 / total.0 as f64)
        }
    }
}

impl AddAssign for PlayCount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl fmt::Display for PlayCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
