//! Date and time utilities

use chrono::{Duration, Utc};

/// Current unix timestamp in seconds
pub fn now() -> i64 {
    Utc::now().timestamp()
}

/// Get Unix timestamp from N days ago
pub fn get_timestamp_days_ago(days: i64) -> i64 {
    let past = Utc::now() - Duration::days(days);
    past.timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_ago() {
        let diff = now() - get_timestamp_days_ago(1);
        // allow a second of drift between the two calls
        assert!((86_400..=86_401).contains(&diff));
    }
}
