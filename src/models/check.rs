use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Completion record stored in redb, keyed by "habit_id/YYYY-MM-DD".
/// Append-only: created by the check operation, removed only when the
/// owning habit cascades away.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRecord {
    /// Check ID (UUID v4)
    pub id: String,
    /// Owning habit; immutable
    pub habit_id: String,
    /// Calendar day of the completion (UTC, day granularity)
    pub date_checked: NaiveDate,
    /// Experience awarded, frozen at creation time
    pub xp_earned: i64,
    /// When the record was created (Unix timestamp)
    pub created_at: i64,
}
