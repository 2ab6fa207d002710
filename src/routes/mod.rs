pub mod auth;
pub mod habits;
pub mod health;
pub mod profile;
pub mod social;
pub mod validation;

pub use auth::{login_user, register_user};
pub use habits::{
    check_habit, create_habit, delete_habit, habit_stats, list_habits, overall_stats, update_habit,
};
pub use health::health_check;
pub use profile::{get_profile, update_profile};
pub use social::{
    add_friend, friend_habits, leaderboard, list_friends, remove_friend, search_users,
};
pub use validation::{timestamp_to_rfc3339, validate_limit};
