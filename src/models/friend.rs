use serde::{Deserialize, Serialize};

/// Status of a friendship edge. Edges created through the API are always
/// `Accepted`; the other states exist for data compatibility only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendStatus {
    Pending,
    Accepted,
    Blocked,
}

/// Directed friendship edge stored in redb, keyed by "user_id/friend_id".
/// A single edge represents the relationship; readers check both
/// orientations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendRecord {
    /// Edge ID (UUID v4)
    pub id: String,
    /// User who initiated the friendship
    pub user_id: String,
    /// The befriended user
    pub friend_id: String,
    pub status: FriendStatus,
    /// When the edge was created (Unix timestamp)
    pub created_at: i64,
}

impl FriendRecord {
    pub fn is_accepted(&self) -> bool {
        self.status == FriendStatus::Accepted
    }
}
