use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};

/// Convert Unix timestamp to RFC3339 string, defaulting to now if invalid
pub fn timestamp_to_rfc3339(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .unwrap_or_else(Utc::now)
        .to_rfc3339()
}

/// Resolve a requested result limit against a default and an upper bound.
/// Zero and out-of-range values are rejected rather than clamped.
pub fn validate_limit(requested: Option<usize>, default: usize, max: usize) -> Result<usize> {
    match requested {
        None => Ok(default),
        Some(n) if n >= 1 && n <= max => Ok(n),
        Some(_) => Err(AppError::InvalidInput(format!(
            "limit must be between 1 and {}",
            max
        ))),
    }
}
