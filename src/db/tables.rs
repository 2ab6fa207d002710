use redb::TableDefinition;

/// Users table: user_id (UUID) -> UserRecord (serialized)
pub const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Email index: email -> user_id
/// The key is the email as stored (case-sensitive); inserting through this
/// table inside a write transaction is what enforces email uniqueness.
pub const USER_EMAILS: TableDefinition<&str, &str> = TableDefinition::new("user_emails");

/// Habits table: habit_id (UUID) -> HabitRecord (serialized)
pub const HABITS: TableDefinition<&str, &[u8]> = TableDefinition::new("habits");

/// User habits index: user_id -> Vec<habit_id>
/// Used for listing and for cascade delete when a habit's owner is involved
pub const USER_HABITS: TableDefinition<&str, &[u8]> = TableDefinition::new("user_habits");

/// Habit checks table: "habit_id/YYYY-MM-DD" -> CheckRecord (serialized)
/// The composite key makes (habit, day) uniqueness structural: a second
/// insert for the same pair can only ever observe the first one.
pub const HABIT_CHECKS: TableDefinition<&str, &[u8]> = TableDefinition::new("habit_checks");

/// Friendship edges: "user_id/friend_id" -> FriendRecord (serialized)
/// Edges are directed; readers must consult both orientations.
pub const FRIEND_EDGES: TableDefinition<&str, &[u8]> = TableDefinition::new("friend_edges");

/// Friend index: user_id -> Vec<user_id>, maintained for both endpoints of
/// every edge so "list friends" never scans the edge table
pub const FRIEND_INDEX: TableDefinition<&str, &[u8]> = TableDefinition::new("friend_index");
