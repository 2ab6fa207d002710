use serde::{Deserialize, Serialize};

use crate::constants::{MAX_DESCRIPTION_LEN, MAX_ICON_LEN, MAX_TITLE_LEN};
use crate::routes::validation::timestamp_to_rfc3339;

/// Fixed set of habit categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Health,
    Fitness,
    Learning,
    Productivity,
    Mindfulness,
    Social,
    Creative,
    Finance,
}

/// Habit record stored in redb
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitRecord {
    /// Habit ID (UUID v4)
    pub id: String,
    /// Owning user; immutable once created
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: Category,
    /// Icon glyph (emoji or short text)
    pub icon: String,
    /// Integer-packed ARGB color
    pub color: u32,
    /// Whether friends may see this habit
    pub is_public: bool,
    /// When the habit was created (Unix timestamp)
    pub created_at: i64,
    /// When the habit was last updated (Unix timestamp)
    pub updated_at: i64,
}

/// Habit model for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: Category,
    pub icon: String,
    pub color: u32,
    pub is_public: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Habit {
    /// Validate a habit title (1..=100 characters)
    pub fn validate_title(title: &str) -> bool {
        !title.is_empty() && title.chars().count() <= MAX_TITLE_LEN
    }

    /// Validate a habit description (up to 500 characters, empty allowed)
    pub fn validate_description(description: &str) -> bool {
        description.chars().count() <= MAX_DESCRIPTION_LEN
    }

    /// Validate an icon glyph (1..=10 characters)
    pub fn validate_icon(icon: &str) -> bool {
        !icon.is_empty() && icon.chars().count() <= MAX_ICON_LEN
    }
}

impl From<&HabitRecord> for Habit {
    fn from(record: &HabitRecord) -> Self {
        Habit {
            id: record.id.clone(),
            user_id: record.user_id.clone(),
            title: record.title.clone(),
            description: record.description.clone(),
            category: record.category,
            icon: record.icon.clone(),
            color: record.color,
            is_public: record.is_public,
            created_at: timestamp_to_rfc3339(record.created_at),
            updated_at: timestamp_to_rfc3339(record.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serde_names() {
        assert_eq!(
            serde_json::to_string(&Category::Health).unwrap(),
            "\"Health\""
        );
        assert_eq!(
            serde_json::from_str::<Category>("\"Mindfulness\"").unwrap(),
            Category::Mindfulness
        );
        assert!(serde_json::from_str::<Category>("\"Sports\"").is_err());
    }

    #[test]
    fn test_validate_title() {
        assert!(Habit::validate_title("Morning Exercise"));
        assert!(!Habit::validate_title(""));
        assert!(!Habit::validate_title(&"x".repeat(MAX_TITLE_LEN + 1)));
        assert!(Habit::validate_title(&"x".repeat(MAX_TITLE_LEN)));
    }

    #[test]
    fn test_validate_description() {
        assert!(Habit::validate_description(""));
        assert!(Habit::validate_description("Read 20 pages"));
        assert!(!Habit::validate_description(
            &"x".repeat(MAX_DESCRIPTION_LEN + 1)
        ));
    }

    #[test]
    fn test_validate_icon() {
        assert!(Habit::validate_icon("💪"));
        assert!(!Habit::validate_icon(""));
        assert!(!Habit::validate_icon(&"x".repeat(MAX_ICON_LEN + 1)));
    }
}
