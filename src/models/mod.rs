pub mod check;
pub mod friend;
pub mod habit;
pub mod user;

pub use check::CheckRecord;
pub use friend::{FriendRecord, FriendStatus};
pub use habit::{Category, Habit, HabitRecord};
pub use user::{User, UserRecord};
