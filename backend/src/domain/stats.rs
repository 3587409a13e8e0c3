//! Per-user or global activity counters.

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use super::content::ContentKind;

/// Key under which reply counts are reported.
pub const MESSAGE_STAT: &str = "message";

/// Counts keyed by content kind label plus [`MESSAGE_STAT`].
///
/// Recomputed on demand; never persisted. Kinds with no rows are absent
/// rather than zero, matching a grouped `count(*)`.
///
/// # Examples
/// ```
/// use focus::domain::{ContentKind, UserStats};
///
/// let stats = UserStats::from_counts([("article".to_owned(), 3)], 5);
/// assert_eq!(stats.count_for(ContentKind::Article), 3);
/// assert_eq!(stats.messages(), 5);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(transparent)]
pub struct UserStats(BTreeMap<String, i64>);

impl UserStats {
    /// Build the map from per-kind content counts plus the reply count.
    pub fn from_counts(
        content_counts: impl IntoIterator<Item = (String, i64)>,
        reply_count: i64,
    ) -> Self {
        let mut counts: BTreeMap<String, i64> = content_counts.into_iter().collect();
        counts.insert(MESSAGE_STAT.to_owned(), reply_count);
        Self(counts)
    }

    /// Count stored under `label`.
    pub fn get(&self, label: &str) -> Option<i64> {
        self.0.get(label).copied()
    }

    /// Content count for `kind`, zero when absent.
    pub fn count_for(&self, kind: ContentKind) -> i64 {
        self.get(kind.as_str()).unwrap_or(0)
    }

    /// Number of replies.
    pub fn messages(&self) -> i64 {
        self.get(MESSAGE_STAT).unwrap_or(0)
    }

    /// All counters keyed by label.
    pub fn as_map(&self) -> &BTreeMap<String, i64> {
        &self.0
    }
}
