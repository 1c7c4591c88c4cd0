//! Wall-clock access. Every "now"-defaulting operation reads the time here;
//! the pure `*_at` variants take the instant explicitly.

use chrono::{DateTime, Utc};

/// Current UTC instant.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current Unix epoch time in milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
