pub mod tables;

use chrono::NaiveDate;
use redb::{Database, Error as RedbError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Database handle type (Arc-wrapped for sharing across handlers)
pub type Db = Arc<Database>;

/// Bincode configuration shared by every record encode/decode
pub const BINCODE_CONFIG: bincode::config::Configuration = bincode::config::standard();

/// Serialize a record for storage
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, bincode::error::EncodeError> {
    bincode::serde::encode_to_vec(value, BINCODE_CONFIG)
}

/// Deserialize a stored record
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, bincode::error::DecodeError> {
    bincode::serde::decode_from_slice(bytes, BINCODE_CONFIG).map(|(value, _)| value)
}

/// Key of a completion record in HABIT_CHECKS
pub fn check_key(habit_id: &str, day: NaiveDate) -> String {
    format!("{}/{}", habit_id, day.format("%Y-%m-%d"))
}

/// Half-open key range covering every completion record of one habit.
/// '0' is the ASCII successor of '/', and habit ids (UUIDs) never contain
/// either character, so this bounds exactly the "habit_id/" prefix.
pub fn check_key_range(habit_id: &str) -> (String, String) {
    (format!("{}/", habit_id), format!("{}0", habit_id))
}

/// Key of a directed friendship edge in FRIEND_EDGES
pub fn edge_key(user_id: &str, friend_id: &str) -> String {
    format!("{}/{}", user_id, friend_id)
}

/// Open or create the redb database at the given path
///
/// Creates all required tables on first run.
#[allow(clippy::result_large_err)]
pub fn open_database(path: impl AsRef<Path>) -> Result<Db, RedbError> {
    tracing::info!("Opening database at: {:?}", path.as_ref());

    // Create parent directory if it doesn't exist
    if let Some(parent) = path.as_ref().parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| {
                tracing::error!("Failed to create database directory: {}", e);
                RedbError::Io(e)
            })?;
        }
    }

    let db = Database::create(path)?;

    // Initialize tables on first run
    let write_txn = db.begin_write()?;
    {
        // Create tables if they don't exist by opening them
        let _ = write_txn.open_table(tables::USERS)?;
        let _ = write_txn.open_table(tables::USER_EMAILS)?;
        let _ = write_txn.open_table(tables::HABITS)?;
        let _ = write_txn.open_table(tables::USER_HABITS)?;
        let _ = write_txn.open_table(tables::HABIT_CHECKS)?;
        let _ = write_txn.open_table(tables::FRIEND_EDGES)?;
        let _ = write_txn.open_table(tables::FRIEND_INDEX)?;
    }
    write_txn.commit()?;

    tracing::info!("Database initialized successfully");

    Ok(Arc::new(db))
}
