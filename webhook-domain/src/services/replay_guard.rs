// Replay window validation

use chrono::Utc;
use serde_json::Value;
use tracing::warn;

use crate::value_objects::parse_unix_seconds;

/// Whether `timestamp` lies within `tolerance_seconds` of now, in either
/// direction. Absent or unparseable timestamps are never fresh.
pub fn is_fresh(timestamp: Option<&Value>, tolerance_seconds: u64) -> bool {
    is_fresh_at(timestamp, tolerance_seconds, Utc::now().timestamp())
}

pub fn is_fresh_at(timestamp: Option<&Value>, tolerance_seconds: u64, now: i64) -> bool {
    let Some(ts) = timestamp.and_then(parse_unix_seconds) else {
        warn!(timestamp = ?timestamp, "invalid timestamp format");
        return false;
    };

    let age = (i128::from(now) - i128::from(ts)).unsigned_abs();
    let is_valid = age <= u128::from(tolerance_seconds);
    if !is_valid {
        warn!(age_seconds = %age, tolerance_seconds, "stale timestamp");
    }
    is_valid
}
