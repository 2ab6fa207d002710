/// Experience awarded for each habit completion.
/// Frozen into the completion record at creation time; changing this
/// constant never rewrites historical records.
pub const XP_PER_CHECK: i64 = 10;

/// Experience required per level. Level = xp / XP_PER_LEVEL + 1.
pub const XP_PER_LEVEL: i64 = 100;

/// Token lifetime in days when TOKEN_TTL_DAYS is not set
pub const DEFAULT_TOKEN_TTL_DAYS: u64 = 7;

/// Maximum length of a habit title
pub const MAX_TITLE_LEN: usize = 100;

/// Maximum length of a habit description
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Maximum length of a habit icon glyph
pub const MAX_ICON_LEN: usize = 10;

/// Bounds for a user display name
pub const MIN_NAME_LEN: usize = 2;
pub const MAX_NAME_LEN: usize = 100;

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_LEN: usize = 6;

/// Minimum length of a user-search query
pub const MIN_SEARCH_QUERY_LEN: usize = 2;

/// Default and maximum number of leaderboard entries per request
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;
pub const MAX_LEADERBOARD_LIMIT: usize = 100;

/// Default and maximum number of user-search results per request
pub const DEFAULT_SEARCH_LIMIT: usize = 10;
pub const MAX_SEARCH_LIMIT: usize = 20;

// =============================================================================
// Error Messages
// =============================================================================

/// Error message when a habit is absent or owned by someone else
pub const ERR_HABIT_NOT_FOUND: &str = "Habit not found";

/// Error message for a duplicate completion on the same calendar day
pub const ERR_ALREADY_CHECKED: &str = "Habit already checked today";

/// Error message for a duplicate registration email
pub const ERR_EMAIL_TAKEN: &str = "Email already registered";

/// Error message for failed login (never distinguishes email from password)
pub const ERR_BAD_CREDENTIALS: &str = "Invalid email or password";

/// Error message for a duplicate friendship edge in either direction
pub const ERR_FRIENDSHIP_EXISTS: &str = "Friendship already exists";

/// Error message when no accepted edge connects two users
pub const ERR_FRIENDSHIP_NOT_FOUND: &str = "Friendship not found";

/// Error message for adding oneself as a friend
pub const ERR_SELF_FRIEND: &str = "Cannot add yourself as friend";
