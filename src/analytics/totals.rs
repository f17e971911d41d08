//! Total plays per user, shared by loyalty scoring and night-owl detection

use std::collections::HashMap;

use rayon::prelude::*;

use super::genre::merge_counts;
use crate::records::ListeningEvent;
use crate::types::PlayCount;

/// Number of events per user, over the raw event log.
///
/// Events without a user are counted in their own group, which no user id
/// ever joins against.
#[derive(Debug, Clone, Default)]
pub struct UserTotals {
    by_user: HashMap<String, PlayCount>,
    unattributed: PlayCount,
}

impl UserTotals {
    /// Aggregate total plays from raw events.
    pub fn from_events(events: &[ListeningEvent]) -> Self {
        let mut counts = events
            .par_iter()
            .fold(HashMap::<Option<&str>, PlayCount>::new, |mut acc, event| {
                *acc.entry(event.user_id.as_deref()).or_default() += PlayCount::ONE;
                acc
            })
            .reduce(HashMap::new, merge_counts);

        let unattributed = counts.remove(&None).unwrap_or_default();
        let by_user = counts
            .into_iter()
            .filter_map(|(user, count)| user.map(|user| (user.to_string(), count)))
            .collect();

        Self {
            by_user,
            unattributed,
        }
    }

    /// Total plays of a user; `None` for users absent from the log.
    #[must_use]
    pub fn get(&self, user_id: &str) -> Option<PlayCount> {
        self.by_user.get(user_id).copied()
    }

    /// Plays recorded without a user id.
    #[must_use]
    pub const fn unattributed(&self) -> PlayCount {
        self.unattributed
    }

    /// Number of groups, the missing-user group included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_user.len() + usize::from(!self.unattributed.is_zero())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
