use axum::{extract::State, Json};
use chrono::Utc;
use redb::ReadableTable;
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::constants::{MAX_NAME_LEN, MIN_NAME_LEN};
use crate::db::tables;
use crate::error::{AppError, Result};
use crate::models::{User, UserRecord};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Get the authenticated user's profile
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ProfileResponse>> {
    let db = state.db.clone();
    let user_id = auth.id;

    let record = tokio::task::spawn_blocking(move || -> Result<UserRecord> {
        let read_txn = db.begin_read()?;
        let users = read_txn.open_table(tables::USERS)?;

        users
            .get(user_id.as_str())?
            .map(|v| crate::db::decode(v.value()))
            .transpose()?
            .ok_or(AppError::NotFound("User not found"))
    })
    .await??;

    Ok(Json(ProfileResponse {
        user: User::from(&record),
    }))
}

/// Update the authenticated user's display data
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>> {
    if let Some(ref name) = payload.name {
        let len = name.chars().count();
        if len < MIN_NAME_LEN || len > MAX_NAME_LEN {
            return Err(AppError::InvalidInput(format!(
                "Name must be between {} and {} characters",
                MIN_NAME_LEN, MAX_NAME_LEN
            )));
        }
    }

    let db = state.db.clone();
    let user_id = auth.id;

    let record = tokio::task::spawn_blocking(move || -> Result<UserRecord> {
        let write_txn = db.begin_write()?;
        let record = {
            let mut users = write_txn.open_table(tables::USERS)?;

            let mut record: UserRecord = users
                .get(user_id.as_str())?
                .map(|v| crate::db::decode(v.value()))
                .transpose()?
                .ok_or(AppError::NotFound("User not found"))?;

            if let Some(name) = payload.name {
                record.name = name;
            }
            if let Some(avatar_url) = payload.avatar_url {
                // An empty string clears the avatar
                record.avatar_url = if avatar_url.is_empty() {
                    None
                } else {
                    Some(avatar_url)
                };
            }
            record.updated_at = Utc::now().timestamp();

            let bytes = crate::db::encode(&record)?;
            users.insert(record.id.as_str(), bytes.as_slice())?;
            record
        };
        write_txn.commit()?;

        Ok(record)
    })
    .await??;

    tracing::info!("Profile updated for user {}", record.id);

    Ok(Json(ProfileResponse {
        user: User::from(&record),
    }))
}
