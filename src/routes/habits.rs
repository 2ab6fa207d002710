use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{Days, NaiveDate, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::constants::{ERR_ALREADY_CHECKED, ERR_HABIT_NOT_FOUND, XP_PER_CHECK};
use crate::db::{check_key, check_key_range, tables};
use crate::error::{AppError, Result};
use crate::models::{Category, CheckRecord, Habit, HabitRecord, UserRecord};
use crate::progression::{apply_experience, current_streak, longest_streak};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateHabitRequest {
    pub title: String,
    pub description: Option<String>,
    pub category: Category,
    pub icon: String,
    pub color: u32,
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateHabitRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub icon: Option<String>,
    pub color: Option<u32>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct HabitResponse {
    pub habit: Habit,
}

#[derive(Debug, Serialize)]
pub struct HabitListResponse {
    pub habits: Vec<Habit>,
}

#[derive(Debug, Serialize)]
pub struct DeleteHabitResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CheckHabitResponse {
    pub xp_earned: i64,
    pub total_xp: i64,
    pub level: i64,
    pub level_up: bool,
    pub streak: u32,
}

#[derive(Debug, Serialize)]
pub struct HabitStats {
    pub habit_id: String,
    pub total_checks: usize,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_xp: i64,
    pub last_checked: Option<NaiveDate>,
    pub check_dates: Vec<NaiveDate>,
    pub is_checked_today: bool,
}

#[derive(Debug, Serialize)]
pub struct HabitStatsResponse {
    pub stats: HabitStats,
}

#[derive(Debug, Serialize)]
pub struct OverallStats {
    pub total_habits: usize,
    pub total_checks: usize,
    pub total_xp: i64,
    pub completed_today: usize,
    pub weekly_total: usize,
    pub completion_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct OverallStatsResponse {
    pub stats: OverallStats,
}

/// Load a habit and verify it belongs to the caller.
/// Ownership failures are indistinguishable from absence.
fn get_owned_habit<T>(habits: &T, habit_id: &str, user_id: &str) -> Result<HabitRecord>
where
    T: ReadableTable<&'static str, &'static [u8]>,
{
    let record: HabitRecord = habits
        .get(habit_id)?
        .map(|v| crate::db::decode(v.value()))
        .transpose()?
        .ok_or(AppError::NotFound(ERR_HABIT_NOT_FOUND))?;

    if record.user_id != user_id {
        tracing::warn!("Habit {} accessed by non-owner", habit_id);
        return Err(AppError::NotFound(ERR_HABIT_NOT_FOUND));
    }

    Ok(record)
}

/// Load every completion record of a habit, oldest first (key order)
fn load_checks<T>(checks: &T, habit_id: &str) -> Result<Vec<CheckRecord>>
where
    T: ReadableTable<&'static str, &'static [u8]>,
{
    let (start, end) = check_key_range(habit_id);
    let mut records = Vec::new();
    for entry in checks.range(start.as_str()..end.as_str())? {
        let (_, value) = entry?;
        records.push(crate::db::decode(value.value())?);
    }
    Ok(records)
}

/// Habit ids owned by a user, in creation order
fn habit_ids_of<T>(user_habits: &T, user_id: &str) -> Result<Vec<String>>
where
    T: ReadableTable<&'static str, &'static [u8]>,
{
    Ok(user_habits
        .get(user_id)?
        .map(|v| crate::db::decode(v.value()))
        .transpose()?
        .unwrap_or_default())
}

/// List the caller's habits, newest first
pub async fn list_habits(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<HabitListResponse>> {
    let db = state.db.clone();
    let user_id = auth.id;

    let habits = tokio::task::spawn_blocking(move || -> Result<Vec<HabitRecord>> {
        let read_txn = db.begin_read()?;
        let user_habits = read_txn.open_table(tables::USER_HABITS)?;
        let habits_table = read_txn.open_table(tables::HABITS)?;

        let mut records = Vec::new();
        for id in habit_ids_of(&user_habits, &user_id)? {
            if let Some(bytes) = habits_table.get(id.as_str())? {
                records.push(crate::db::decode::<HabitRecord>(bytes.value())?);
            }
        }
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(records)
    })
    .await??;

    Ok(Json(HabitListResponse {
        habits: habits.iter().map(Habit::from).collect(),
    }))
}

/// Create a new habit owned by the caller
pub async fn create_habit(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateHabitRequest>,
) -> Result<(StatusCode, Json<HabitResponse>)> {
    if !Habit::validate_title(&payload.title) {
        return Err(AppError::InvalidInput(
            "Title must be between 1 and 100 characters".to_string(),
        ));
    }
    if let Some(ref description) = payload.description {
        if !Habit::validate_description(description) {
            return Err(AppError::InvalidInput(
                "Description must be at most 500 characters".to_string(),
            ));
        }
    }
    if !Habit::validate_icon(&payload.icon) {
        return Err(AppError::InvalidInput(
            "Icon must be between 1 and 10 characters".to_string(),
        ));
    }

    let db = state.db.clone();
    let user_id = auth.id;

    let record = tokio::task::spawn_blocking(move || -> Result<HabitRecord> {
        let now = Utc::now().timestamp();
        let record = HabitRecord {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.clone(),
            title: payload.title,
            description: payload.description,
            category: payload.category,
            icon: payload.icon,
            color: payload.color,
            is_public: payload.is_public,
            created_at: now,
            updated_at: now,
        };

        let write_txn = db.begin_write()?;
        {
            let mut habits = write_txn.open_table(tables::HABITS)?;
            let bytes = crate::db::encode(&record)?;
            habits.insert(record.id.as_str(), bytes.as_slice())?;

            let mut user_habits = write_txn.open_table(tables::USER_HABITS)?;
            let mut ids = habit_ids_of(&user_habits, &user_id)?;
            ids.push(record.id.clone());
            let ids_bytes = crate::db::encode(&ids)?;
            user_habits.insert(user_id.as_str(), ids_bytes.as_slice())?;
        }
        write_txn.commit()?;

        Ok(record)
    })
    .await??;

    tracing::info!("Habit created: {} for user {}", record.id, record.user_id);

    Ok((
        StatusCode::CREATED,
        Json(HabitResponse {
            habit: Habit::from(&record),
        }),
    ))
}

/// Update any habit field except id and owner
pub async fn update_habit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(habit_id): Path<String>,
    Json(payload): Json<UpdateHabitRequest>,
) -> Result<Json<HabitResponse>> {
    if let Some(ref title) = payload.title {
        if !Habit::validate_title(title) {
            return Err(AppError::InvalidInput(
                "Title must be between 1 and 100 characters".to_string(),
            ));
        }
    }
    if let Some(ref description) = payload.description {
        if !Habit::validate_description(description) {
            return Err(AppError::InvalidInput(
                "Description must be at most 500 characters".to_string(),
            ));
        }
    }
    if let Some(ref icon) = payload.icon {
        if !Habit::validate_icon(icon) {
            return Err(AppError::InvalidInput(
                "Icon must be between 1 and 10 characters".to_string(),
            ));
        }
    }

    let db = state.db.clone();
    let user_id = auth.id;

    let record = tokio::task::spawn_blocking(move || -> Result<HabitRecord> {
        let write_txn = db.begin_write()?;
        let record = {
            let mut habits = write_txn.open_table(tables::HABITS)?;
            let mut record = get_owned_habit(&habits, &habit_id, &user_id)?;

            if let Some(title) = payload.title {
                record.title = title;
            }
            if let Some(description) = payload.description {
                record.description = Some(description);
            }
            if let Some(category) = payload.category {
                record.category = category;
            }
            if let Some(icon) = payload.icon {
                record.icon = icon;
            }
            if let Some(color) = payload.color {
                record.color = color;
            }
            if let Some(is_public) = payload.is_public {
                record.is_public = is_public;
            }
            record.updated_at = Utc::now().timestamp();

            let bytes = crate::db::encode(&record)?;
            habits.insert(record.id.as_str(), bytes.as_slice())?;
            record
        };
        write_txn.commit()?;

        Ok(record)
    })
    .await??;

    Ok(Json(HabitResponse {
        habit: Habit::from(&record),
    }))
}

/// Delete a habit and cascade-delete its completion records
pub async fn delete_habit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(habit_id): Path<String>,
) -> Result<Json<DeleteHabitResponse>> {
    let db = state.db.clone();
    let user_id = auth.id;

    tokio::task::spawn_blocking(move || -> Result<()> {
        let write_txn = db.begin_write()?;
        {
            let mut habits = write_txn.open_table(tables::HABITS)?;
            get_owned_habit(&habits, &habit_id, &user_id)?;
            habits.remove(habit_id.as_str())?;
            drop(habits);

            // Cascade: completion records never outlive their habit
            let mut checks = write_txn.open_table(tables::HABIT_CHECKS)?;
            let (start, end) = check_key_range(&habit_id);
            let check_keys: Vec<String> = checks
                .range(start.as_str()..end.as_str())?
                .map(|entry| entry.map(|(k, _)| k.value().to_string()))
                .collect::<std::result::Result<_, _>>()?;
            for key in &check_keys {
                checks.remove(key.as_str())?;
            }
            drop(checks);

            let mut user_habits = write_txn.open_table(tables::USER_HABITS)?;
            let mut ids = habit_ids_of(&user_habits, &user_id)?;
            ids.retain(|id| id != &habit_id);
            let ids_bytes = crate::db::encode(&ids)?;
            user_habits.insert(user_id.as_str(), ids_bytes.as_slice())?;
        }
        write_txn.commit()?;

        tracing::info!("Habit {} deleted with its completion records", habit_id);

        Ok(())
    })
    .await??;

    Ok(Json(DeleteHabitResponse {
        success: true,
        message: "Habit deleted successfully".to_string(),
    }))
}

/// Record a completion of the habit for today (UTC calendar date)
///
/// The completion insert and the owner's xp/level update share one write
/// transaction: both commit or neither does. The (habit, day) uniqueness
/// pre-check runs inside that same transaction, and redb serializes
/// writers, so concurrent duplicate attempts cannot both commit.
pub async fn check_habit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(habit_id): Path<String>,
) -> Result<Json<CheckHabitResponse>> {
    let db = state.db.clone();
    let user_id = auth.id;

    let response = tokio::task::spawn_blocking(move || -> Result<CheckHabitResponse> {
        let today = Utc::now().date_naive();
        let now = Utc::now().timestamp();

        let write_txn = db.begin_write()?;
        let response = {
            let habits = write_txn.open_table(tables::HABITS)?;
            get_owned_habit(&habits, &habit_id, &user_id)?;
            drop(habits);

            let mut checks = write_txn.open_table(tables::HABIT_CHECKS)?;
            let key = check_key(&habit_id, today);
            if checks.get(key.as_str())?.is_some() {
                tracing::info!("Duplicate check rejected for habit {}", habit_id);
                return Err(AppError::Conflict(ERR_ALREADY_CHECKED));
            }

            let check = CheckRecord {
                id: Uuid::new_v4().to_string(),
                habit_id: habit_id.clone(),
                date_checked: today,
                xp_earned: XP_PER_CHECK,
                created_at: now,
            };
            let check_bytes = crate::db::encode(&check)?;
            checks.insert(key.as_str(), check_bytes.as_slice())?;

            let days: Vec<NaiveDate> = load_checks(&checks, &habit_id)?
                .iter()
                .map(|c| c.date_checked)
                .collect();
            let streak = current_streak(&days, today);
            drop(checks);

            let mut users = write_txn.open_table(tables::USERS)?;
            let mut user: UserRecord = users
                .get(user_id.as_str())?
                .map(|v| crate::db::decode(v.value()))
                .transpose()?
                .ok_or(AppError::NotFound("User not found"))?;

            let update = apply_experience(user.xp, user.level, XP_PER_CHECK);
            user.xp = update.xp;
            user.level = update.level;
            user.updated_at = now;
            let user_bytes = crate::db::encode(&user)?;
            users.insert(user.id.as_str(), user_bytes.as_slice())?;

            CheckHabitResponse {
                xp_earned: XP_PER_CHECK,
                total_xp: update.xp,
                level: update.level,
                level_up: update.leveled_up,
                streak,
            }
        };
        write_txn.commit()?;

        Ok(response)
    })
    .await??;

    tracing::info!(
        "Habit checked: +{} xp, level {} (streak {})",
        response.xp_earned,
        response.level,
        response.streak
    );

    Ok(Json(response))
}

/// Per-habit statistics for its owner
pub async fn habit_stats(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(habit_id): Path<String>,
) -> Result<Json<HabitStatsResponse>> {
    let db = state.db.clone();
    let user_id = auth.id;

    let stats = tokio::task::spawn_blocking(move || -> Result<HabitStats> {
        let today = Utc::now().date_naive();

        let read_txn = db.begin_read()?;
        let habits = read_txn.open_table(tables::HABITS)?;
        get_owned_habit(&habits, &habit_id, &user_id)?;

        let checks_table = read_txn.open_table(tables::HABIT_CHECKS)?;
        let records = load_checks(&checks_table, &habit_id)?;

        let days: Vec<NaiveDate> = records.iter().map(|c| c.date_checked).collect();
        let total_xp = records.iter().map(|c| c.xp_earned).sum();

        let mut check_dates = days.clone();
        check_dates.sort_unstable_by(|a, b| b.cmp(a));

        Ok(HabitStats {
            habit_id,
            total_checks: records.len(),
            current_streak: current_streak(&days, today),
            longest_streak: longest_streak(&days),
            total_xp,
            last_checked: days.iter().max().copied(),
            is_checked_today: days.contains(&today),
            check_dates,
        })
    })
    .await??;

    Ok(Json(HabitStatsResponse { stats }))
}

/// Aggregate statistics across all the caller's habits
pub async fn overall_stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<OverallStatsResponse>> {
    let db = state.db.clone();
    let user_id = auth.id;

    let stats = tokio::task::spawn_blocking(move || -> Result<OverallStats> {
        let today = Utc::now().date_naive();
        let week_start = today - Days::new(7);

        let read_txn = db.begin_read()?;
        let user_habits = read_txn.open_table(tables::USER_HABITS)?;
        let checks_table = read_txn.open_table(tables::HABIT_CHECKS)?;

        let habit_ids = habit_ids_of(&user_habits, &user_id)?;

        let mut total_checks = 0;
        let mut total_xp = 0;
        let mut completed_today = 0;
        let mut weekly_total = 0;
        for habit_id in &habit_ids {
            for check in load_checks(&checks_table, habit_id)? {
                total_checks += 1;
                total_xp += check.xp_earned;
                if check.date_checked == today {
                    completed_today += 1;
                }
                if check.date_checked >= week_start {
                    weekly_total += 1;
                }
            }
        }

        let completion_rate = if habit_ids.is_empty() {
            0.0
        } else {
            completed_today as f64 / habit_ids.len() as f64
        };

        Ok(OverallStats {
            total_habits: habit_ids.len(),
            total_checks,
            total_xp,
            completed_today,
            weekly_total,
            completion_rate,
        })
    })
    .await??;

    Ok(Json(OverallStatsResponse { stats }))
}
