//! # Time Utilities
//!
//! Timestamps are always UTC; the wire form is RFC 3339.

use chrono::{DateTime, Utc};

/// Get current UTC time.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Format time as RFC3339 string.
pub fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_time_is_rfc3339_utc() {
        let moment = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_time(moment), "2025-01-02T03:04:05+00:00");
    }

    #[test]
    fn test_now_is_monotonic_enough() {
        let a = now_utc();
        let b = now_utc();
        assert!(b >= a);
    }
}
