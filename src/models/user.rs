use serde::{Deserialize, Serialize};

use crate::routes::validation::timestamp_to_rfc3339;

/// User record stored in redb
/// Uses Unix timestamps for compact storage with bincode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// User ID (UUID v4)
    pub id: String,
    /// Display name
    pub name: String,
    /// Email as given at registration (case-sensitive, unique)
    pub email: String,
    /// Argon2id PHC hash of the password; never serialized to clients
    pub password_hash: String,
    /// Accumulated experience
    pub xp: i64,
    /// Level derived from xp; stored so reads never recompute
    pub level: i64,
    /// Optional avatar reference
    pub avatar_url: Option<String>,
    /// When the user was created (Unix timestamp)
    pub created_at: i64,
    /// When the user was last updated (Unix timestamp)
    pub updated_at: i64,
}

/// User model for API responses (credential hash stripped)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub xp: i64,
    pub level: i64,
    pub avatar_url: Option<String>,
    pub created_at: String,
}

impl User {
    /// Validate the shape of an email address: one '@', non-empty local
    /// part, domain with a dot, no whitespace
    pub fn validate_email(email: &str) -> bool {
        if email.chars().any(|c| c.is_whitespace()) {
            return false;
        }
        let mut parts = email.splitn(2, '@');
        let local = parts.next().unwrap_or("");
        let domain = parts.next().unwrap_or("");
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return false;
        }
        let mut domain_parts = domain.rsplitn(2, '.');
        let tld = domain_parts.next().unwrap_or("");
        let host = domain_parts.next().unwrap_or("");
        !tld.is_empty() && !host.is_empty()
    }
}

impl From<&UserRecord> for User {
    fn from(record: &UserRecord) -> Self {
        User {
            id: record.id.clone(),
            name: record.name.clone(),
            email: record.email.clone(),
            xp: record.xp,
            level: record.level,
            avatar_url: record.avatar_url.clone(),
            created_at: timestamp_to_rfc3339(record.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(User::validate_email("john@example.com"));
        assert!(User::validate_email("a.b+c@sub.example.org"));

        assert!(!User::validate_email(""));
        assert!(!User::validate_email("no-at-sign"));
        assert!(!User::validate_email("@example.com"));
        assert!(!User::validate_email("john@"));
        assert!(!User::validate_email("john@nodot"));
        assert!(!User::validate_email("john@.com"));
        assert!(!User::validate_email("jo hn@example.com"));
        assert!(!User::validate_email("john@exa@mple.com"));
    }

    #[test]
    fn test_user_view_strips_credential_hash() {
        let record = UserRecord {
            id: "user-1".to_string(),
            name: "John".to_string(),
            email: "john@example.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
            xp: 150,
            level: 2,
            avatar_url: None,
            created_at: 1733788800,
            updated_at: 1733788800,
        };

        let view = User::from(&record);
        let json = serde_json::to_value(&view).unwrap();

        assert!(json.get("password_hash").is_none());
        assert_eq!(json["xp"], 150);
        assert_eq!(json["level"], 2);
    }

    #[test]
    fn test_user_record_serialization() {
        let record = UserRecord {
            id: "user-1".to_string(),
            name: "John".to_string(),
            email: "john@example.com".to_string(),
            password_hash: "hash".to_string(),
            xp: 0,
            level: 1,
            avatar_url: Some("https://example.com/a.png".to_string()),
            created_at: 1733788800,
            updated_at: 1733788800,
        };

        // Verify bincode serialization works
        let bytes = crate::db::encode(&record).unwrap();
        let deserialized: UserRecord = crate::db::decode(&bytes).unwrap();

        assert_eq!(record.email, deserialized.email);
        assert_eq!(record.avatar_url, deserialized.avatar_url);
    }
}
