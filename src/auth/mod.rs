pub mod jwt;
pub mod password;

pub use jwt::{extract_bearer_token, Claims, TokenIssuer};
pub use password::{hash_password, verify_password};

use axum::{async_trait, extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};

use crate::error::AppError;
use crate::AppState;

/// The authenticated caller, resolved from the bearer token.
/// Adding this as a handler argument is what protects a route.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub name: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let token = extract_bearer_token(header)
            .ok_or(AppError::Unauthorized("Missing authorization token"))?;

        let claims = state.tokens.verify(token)?;

        Ok(AuthUser {
            id: claims.sub,
            email: claims.email,
            name: claims.name,
        })
    }
}
