//! Timestamp coercion for partition boundaries.
//!
//! The registry normalizes every boundary to UTC. Timestamps that arrive
//! without an offset are assumed to already be UTC and are coerced, not
//! rejected (the permissive policy; see the readiness contract).

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::{ModelError, Result};

/// Attach UTC to a naive timestamp.
pub fn coerce_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    DateTime::from_naive_utc_and_offset(naive, Utc)
}

/// Parse a timestamp from its wire form.
///
/// Accepted, in order: RFC 3339 with offset (normalized to UTC), naive
/// `YYYY-MM-DDTHH:MM:SS[.fff]`, naive `YYYY-MM-DD HH:MM:SS[.fff]`, and a
/// bare date (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(coerce_utc(naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(coerce_utc(date.and_hms_opt(0, 0, 0).unwrap_or_default()));
    }
    Err(ModelError::Timestamp(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rfc3339_with_offset_is_normalized_to_utc() {
        let parsed = parse_timestamp("2000-01-01T02:00:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn naive_timestamp_is_coerced_not_rejected() {
        let parsed = parse_timestamp("2000-01-01T12:30:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2000, 1, 1, 12, 30, 0).unwrap());

        let spaced = parse_timestamp("2000-01-01 12:30:00").unwrap();
        assert_eq!(spaced, parsed);
    }

    #[test]
    fn bare_date_means_midnight_utc() {
        let parsed = parse_timestamp("2000-01-10").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2000, 1, 10, 0, 0, 0).unwrap());
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_timestamp("tomorrow").is_err());
    }
}
