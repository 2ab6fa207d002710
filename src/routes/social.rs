use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::constants::{
    DEFAULT_LEADERBOARD_LIMIT, DEFAULT_SEARCH_LIMIT, ERR_FRIENDSHIP_EXISTS,
    ERR_FRIENDSHIP_NOT_FOUND, ERR_SELF_FRIEND, MAX_LEADERBOARD_LIMIT, MAX_SEARCH_LIMIT,
    MIN_SEARCH_QUERY_LEN,
};
use crate::db::{edge_key, tables};
use crate::error::{AppError, Result};
use crate::models::{FriendRecord, FriendStatus, Habit, HabitRecord, User, UserRecord};
use crate::routes::validation::validate_limit;
use crate::AppState;

/// Leaderboard period. Accepted for API compatibility; the ranking metric
/// is always all-time experience (see DESIGN.md).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Weekly,
    Monthly,
    All,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    #[serde(default)]
    pub period: Period,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    #[serde(flatten)]
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub leaderboard: Vec<LeaderboardEntry>,
    pub period: Period,
    pub total_users: usize,
}

#[derive(Debug, Deserialize)]
pub struct AddFriendRequest {
    pub friend_email: String,
}

#[derive(Debug, Serialize)]
pub struct AddFriendResponse {
    pub friend: User,
}

#[derive(Debug, Serialize)]
pub struct FriendListResponse {
    pub friends: Vec<User>,
}

#[derive(Debug, Serialize)]
pub struct FriendHabitsResponse {
    pub habits: Vec<Habit>,
}

#[derive(Debug, Serialize)]
pub struct RemoveFriendResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub users: Vec<User>,
}

/// Friend ids of a user, as maintained in the index table
fn friend_ids_of<T>(friend_index: &T, user_id: &str) -> Result<Vec<String>>
where
    T: ReadableTable<&'static str, &'static [u8]>,
{
    Ok(friend_index
        .get(user_id)?
        .map(|v| crate::db::decode(v.value()))
        .transpose()?
        .unwrap_or_default())
}

/// The accepted edge between two users, in whichever direction it exists
fn accepted_edge<T>(edges: &T, a: &str, b: &str) -> Result<Option<FriendRecord>>
where
    T: ReadableTable<&'static str, &'static [u8]>,
{
    for key in [edge_key(a, b), edge_key(b, a)] {
        let record: Option<FriendRecord> = edges
            .get(key.as_str())?
            .map(|v| crate::db::decode(v.value()))
            .transpose()?;
        if let Some(record) = record {
            if record.is_accepted() {
                return Ok(Some(record));
            }
        }
    }
    Ok(None)
}

/// Ranked view of all users by total accumulated experience
///
/// Rank is the 1-based position after a stable sort on xp descending;
/// ties keep user-id key order.
pub async fn leaderboard(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>> {
    let limit = validate_limit(params.limit, DEFAULT_LEADERBOARD_LIMIT, MAX_LEADERBOARD_LIMIT)?;

    let db = state.db.clone();

    let ranked = tokio::task::spawn_blocking(move || -> Result<Vec<UserRecord>> {
        let read_txn = db.begin_read()?;
        let users = read_txn.open_table(tables::USERS)?;

        let mut records = Vec::new();
        for entry in users.iter()? {
            let (_, value) = entry?;
            records.push(crate::db::decode::<UserRecord>(value.value())?);
        }

        // Stable sort: equal xp keeps key order
        records.sort_by(|a, b| b.xp.cmp(&a.xp));
        records.truncate(limit);

        Ok(records)
    })
    .await??;

    let total_users = ranked.len();
    let leaderboard = ranked
        .iter()
        .enumerate()
        .map(|(i, record)| LeaderboardEntry {
            rank: i + 1,
            user: User::from(record),
        })
        .collect();

    Ok(Json(LeaderboardResponse {
        leaderboard,
        period: params.period,
        total_users,
    }))
}

/// Create a friendship with the user holding the given email
///
/// A single directed edge (caller -> friend, accepted) represents the
/// relationship; every read path checks both orientations. Fails with
/// Conflict if an edge already exists in either direction.
pub async fn add_friend(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<AddFriendRequest>,
) -> Result<(StatusCode, Json<AddFriendResponse>)> {
    if payload.friend_email == auth.email {
        return Err(AppError::InvalidInput(ERR_SELF_FRIEND.to_string()));
    }

    let db = state.db.clone();
    let user_id = auth.id.clone();
    let friend_email = payload.friend_email;

    let friend = tokio::task::spawn_blocking(move || -> Result<UserRecord> {
        let write_txn = db.begin_write()?;
        let friend = {
            let emails = write_txn.open_table(tables::USER_EMAILS)?;
            let friend_id = emails
                .get(friend_email.as_str())?
                .map(|v| v.value().to_string())
                .ok_or(AppError::NotFound("User not found"))?;
            drop(emails);

            let users = write_txn.open_table(tables::USERS)?;
            let friend: UserRecord = users
                .get(friend_id.as_str())?
                .map(|v| crate::db::decode(v.value()))
                .transpose()?
                .ok_or(AppError::NotFound("User not found"))?;
            drop(users);

            let mut edges = write_txn.open_table(tables::FRIEND_EDGES)?;
            let forward = edge_key(&user_id, &friend_id);
            let reverse = edge_key(&friend_id, &user_id);
            if edges.get(forward.as_str())?.is_some() || edges.get(reverse.as_str())?.is_some() {
                tracing::info!("Duplicate friendship rejected");
                return Err(AppError::Conflict(ERR_FRIENDSHIP_EXISTS));
            }

            let record = FriendRecord {
                id: Uuid::new_v4().to_string(),
                user_id: user_id.clone(),
                friend_id: friend_id.clone(),
                status: FriendStatus::Accepted,
                created_at: Utc::now().timestamp(),
            };
            let bytes = crate::db::encode(&record)?;
            edges.insert(forward.as_str(), bytes.as_slice())?;
            drop(edges);

            // Index both endpoints so each side lists the other
            let mut friend_index = write_txn.open_table(tables::FRIEND_INDEX)?;
            for (owner, other) in [(&user_id, &friend_id), (&friend_id, &user_id)] {
                let mut ids = friend_ids_of(&friend_index, owner)?;
                if !ids.contains(other) {
                    ids.push(other.clone());
                    let ids_bytes = crate::db::encode(&ids)?;
                    friend_index.insert(owner.as_str(), ids_bytes.as_slice())?;
                }
            }

            friend
        };
        write_txn.commit()?;

        Ok(friend)
    })
    .await??;

    tracing::info!("Friendship created between {} and {}", auth.id, friend.id);

    Ok((
        StatusCode::CREATED,
        Json(AddFriendResponse {
            friend: User::from(&friend),
        }),
    ))
}

/// List the caller's friends (either edge direction)
pub async fn list_friends(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<FriendListResponse>> {
    let db = state.db.clone();
    let user_id = auth.id;

    let friends = tokio::task::spawn_blocking(move || -> Result<Vec<UserRecord>> {
        let read_txn = db.begin_read()?;
        let friend_index = read_txn.open_table(tables::FRIEND_INDEX)?;
        let users = read_txn.open_table(tables::USERS)?;

        let mut records = Vec::new();
        for id in friend_ids_of(&friend_index, &user_id)? {
            if let Some(bytes) = users.get(id.as_str())? {
                records.push(crate::db::decode::<UserRecord>(bytes.value())?);
            }
        }
        Ok(records)
    })
    .await??;

    Ok(Json(FriendListResponse {
        friends: friends.iter().map(User::from).collect(),
    }))
}

/// Public habits of a friend, newest first
///
/// Requires an accepted edge between the caller and the target in either
/// direction; anything else is reported as an absent friendship.
pub async fn friend_habits(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(friend_id): Path<String>,
) -> Result<Json<FriendHabitsResponse>> {
    let db = state.db.clone();
    let user_id = auth.id;

    let habits = tokio::task::spawn_blocking(move || -> Result<Vec<HabitRecord>> {
        let read_txn = db.begin_read()?;

        let edges = read_txn.open_table(tables::FRIEND_EDGES)?;
        if accepted_edge(&edges, &user_id, &friend_id)?.is_none() {
            return Err(AppError::NotFound(ERR_FRIENDSHIP_NOT_FOUND));
        }

        let user_habits = read_txn.open_table(tables::USER_HABITS)?;
        let habits_table = read_txn.open_table(tables::HABITS)?;

        let ids: Vec<String> = user_habits
            .get(friend_id.as_str())?
            .map(|v| crate::db::decode(v.value()))
            .transpose()?
            .unwrap_or_default();

        let mut records = Vec::new();
        for id in ids {
            if let Some(bytes) = habits_table.get(id.as_str())? {
                let record: HabitRecord = crate::db::decode(bytes.value())?;
                if record.is_public {
                    records.push(record);
                }
            }
        }
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(records)
    })
    .await??;

    Ok(Json(FriendHabitsResponse {
        habits: habits.iter().map(Habit::from).collect(),
    }))
}

/// Remove a friendship, whichever direction its edge was stored in
pub async fn remove_friend(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(friend_id): Path<String>,
) -> Result<Json<RemoveFriendResponse>> {
    let db = state.db.clone();
    let user_id = auth.id;

    tokio::task::spawn_blocking(move || -> Result<()> {
        let write_txn = db.begin_write()?;
        {
            let mut edges = write_txn.open_table(tables::FRIEND_EDGES)?;
            let forward = edges.remove(edge_key(&user_id, &friend_id).as_str())?.is_some();
            let reverse = edges.remove(edge_key(&friend_id, &user_id).as_str())?.is_some();
            if !forward && !reverse {
                return Err(AppError::NotFound(ERR_FRIENDSHIP_NOT_FOUND));
            }
            drop(edges);

            let mut friend_index = write_txn.open_table(tables::FRIEND_INDEX)?;
            for (owner, other) in [(&user_id, &friend_id), (&friend_id, &user_id)] {
                let mut ids = friend_ids_of(&friend_index, owner)?;
                ids.retain(|id| id != other);
                let ids_bytes = crate::db::encode(&ids)?;
                friend_index.insert(owner.as_str(), ids_bytes.as_slice())?;
            }
        }
        write_txn.commit()?;

        Ok(())
    })
    .await??;

    Ok(Json(RemoveFriendResponse {
        success: true,
        message: "Friend removed successfully".to_string(),
    }))
}

/// Search users by name or email substring, excluding the caller
pub async fn search_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchResponse>> {
    if params.q.chars().count() < MIN_SEARCH_QUERY_LEN {
        return Err(AppError::InvalidInput(format!(
            "Search query must be at least {} characters",
            MIN_SEARCH_QUERY_LEN
        )));
    }
    let limit = validate_limit(params.limit, DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT)?;

    let db = state.db.clone();
    let user_id = auth.id;
    let needle = params.q.to_lowercase();

    let matches = tokio::task::spawn_blocking(move || -> Result<Vec<UserRecord>> {
        let read_txn = db.begin_read()?;
        let users = read_txn.open_table(tables::USERS)?;

        let mut records = Vec::new();
        for entry in users.iter()? {
            let (_, value) = entry?;
            let record: UserRecord = crate::db::decode(value.value())?;
            if record.id == user_id {
                continue;
            }
            if record.name.to_lowercase().contains(&needle)
                || record.email.to_lowercase().contains(&needle)
            {
                records.push(record);
                if records.len() == limit {
                    break;
                }
            }
        }
        Ok(records)
    })
    .await??;

    Ok(Json(SearchResponse {
        users: matches.iter().map(User::from).collect(),
    }))
}
