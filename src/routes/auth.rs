use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{hash_password, verify_password};
use crate::constants::{ERR_BAD_CREDENTIALS, ERR_EMAIL_TAKEN, MAX_NAME_LEN, MIN_NAME_LEN, MIN_PASSWORD_LEN};
use crate::db::tables;
use crate::error::{AppError, Result};
use crate::models::{User, UserRecord};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// Register a new user
///
/// Validates the payload, hashes the password (argon2id, per-hash random
/// salt), and creates the user with 0 xp at level 1. Email uniqueness is
/// enforced inside the write transaction through the email index table.
///
/// Returns 409 Conflict if the email is already registered.
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let name_len = payload.name.chars().count();
    if name_len < MIN_NAME_LEN || name_len > MAX_NAME_LEN {
        return Err(AppError::InvalidInput(format!(
            "Name must be between {} and {} characters",
            MIN_NAME_LEN, MAX_NAME_LEN
        )));
    }

    if !User::validate_email(&payload.email) {
        tracing::warn!("Rejected registration with malformed email");
        return Err(AppError::InvalidInput("Invalid email address".to_string()));
    }

    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidInput(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let db = state.db.clone();
    let name = payload.name.clone();
    let email = payload.email.clone();
    let password = payload.password;

    let record = tokio::task::spawn_blocking(move || -> Result<UserRecord> {
        // Hash before opening the transaction; argon2 is deliberately slow
        let password_hash = hash_password(&password)?;

        let now = Utc::now().timestamp();
        let record = UserRecord {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            password_hash,
            xp: 0,
            level: 1,
            avatar_url: None,
            created_at: now,
            updated_at: now,
        };

        let write_txn = db.begin_write()?;
        {
            let mut emails = write_txn.open_table(tables::USER_EMAILS)?;
            if emails.get(record.email.as_str())?.is_some() {
                tracing::info!("Registration rejected: email already taken");
                return Err(AppError::Conflict(ERR_EMAIL_TAKEN));
            }
            emails.insert(record.email.as_str(), record.id.as_str())?;

            let mut users = write_txn.open_table(tables::USERS)?;
            let bytes = crate::db::encode(&record)?;
            users.insert(record.id.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;

        Ok(record)
    })
    .await??;

    let token = state.tokens.issue(&record.id, &record.email, &record.name)?;

    tracing::info!("New user registered: {}", record.id);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            token,
            user: User::from(&record),
        }),
    ))
}

/// Log an existing user in
///
/// The same Unauthorized response covers an unknown email and a wrong
/// password, so callers cannot probe which emails are registered.
pub async fn login_user(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let db = state.db.clone();
    let email = payload.email.clone();
    let password = payload.password;

    let record = tokio::task::spawn_blocking(move || -> Result<UserRecord> {
        let read_txn = db.begin_read()?;

        let emails = read_txn.open_table(tables::USER_EMAILS)?;
        let user_id = emails
            .get(email.as_str())?
            .map(|v| v.value().to_string())
            .ok_or(AppError::Unauthorized(ERR_BAD_CREDENTIALS))?;

        let users = read_txn.open_table(tables::USERS)?;
        let record: UserRecord = users
            .get(user_id.as_str())?
            .map(|v| crate::db::decode(v.value()))
            .transpose()?
            .ok_or(AppError::Unauthorized(ERR_BAD_CREDENTIALS))?;

        if !verify_password(&password, &record.password_hash)? {
            tracing::info!("Login rejected for user {}", record.id);
            return Err(AppError::Unauthorized(ERR_BAD_CREDENTIALS));
        }

        Ok(record)
    })
    .await??;

    let token = state.tokens.issue(&record.id, &record.email, &record.name)?;

    tracing::info!("User logged in: {}", record.id);

    Ok(Json(LoginResponse {
        token,
        user: User::from(&record),
    }))
}
