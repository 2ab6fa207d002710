//! Bearer token issuance and validation.
//!
//! Tokens are HS256 JWTs carrying the user's id, email, and display name,
//! valid for a fixed duration from issuance (7 days by default).

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{AppError, Result};

/// Payload stored in the bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    pub email: String,
    pub name: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Token issuer and validator, shared through AppState
#[derive(Clone)]
pub struct TokenIssuer {
    secret: String,
    ttl_secs: u64,
}

impl TokenIssuer {
    /// The secret's length is validated by Config before this is reached.
    pub fn new(secret: String, ttl_days: u64) -> Self {
        Self {
            secret,
            ttl_secs: ttl_days * 24 * 60 * 60,
        }
    }

    /// Issue a token for an authenticated user
    pub fn issue(&self, user_id: &str, email: &str, name: &str) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| AppError::Internal(format!("System time error: {}", e)))?
            .as_secs();

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            iat: now,
            exp: now + self.ttl_secs,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to issue token: {}", e)))
    }

    /// Verify and decode a bearer token
    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|err| {
            use jsonwebtoken::errors::ErrorKind;
            match err.kind() {
                ErrorKind::ExpiredSignature => AppError::Unauthorized("Token expired"),
                _ => AppError::Unauthorized("Invalid token"),
            }
        })
    }
}

/// Extract the token from an Authorization header value.
/// Only the "Bearer <token>" form is accepted.
pub fn extract_bearer_token(auth_header: Option<&str>) -> Option<&str> {
    let token = auth_header?.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_issuer() -> TokenIssuer {
        TokenIssuer::new(
            "test-secret-that-is-at-least-32-characters-long".to_string(),
            7,
        )
    }

    #[test]
    fn test_issue_and_verify() {
        let issuer = test_issuer();
        let token = issuer
            .issue("user-123", "john@example.com", "John")
            .unwrap();
        assert!(!token.is_empty());

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-123");
        assert_eq!(claims.email, "john@example.com");
        assert_eq!(claims.name, "John");
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_verify_garbage_token() {
        let issuer = test_issuer();
        assert!(matches!(
            issuer.verify("not-a-token"),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_verify_wrong_secret() {
        let issuer = test_issuer();
        let other = TokenIssuer::new(
            "different-secret-that-is-at-least-32-chars".to_string(),
            7,
        );

        let token = issuer.issue("user-123", "a@b.co", "A").unwrap();
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token(Some("Bearer abc123")), Some("abc123"));
        assert_eq!(extract_bearer_token(None), None);
        assert_eq!(extract_bearer_token(Some("")), None);
        assert_eq!(extract_bearer_token(Some("Bearer ")), None);
        assert_eq!(extract_bearer_token(Some("Basic abc123")), None);
        assert_eq!(extract_bearer_token(Some("abc123")), None);
    }
}
