//! Timestamp coercion for free-text project fields.
//!
//! Began At / Ended At are plain text fields holding RFC 3339 strings, so any
//! value may be malformed. Parsing is strict; callers decide what an invalid
//! value means.

use chrono::{DateTime, FixedOffset};
use thiserror::Error;

/// Byte offset of the date/time separator in `YYYY-MM-DDThh:mm:ss`.
const SEPARATOR_INDEX: usize = 10;

/// Why a field value is not an RFC 3339 timestamp.
#[derive(Debug, Error)]
pub enum TimestampError {
    #[error("expected 'T' between date and time")]
    Separator,
    #[error("expected 'Z' or a numeric UTC offset")]
    Offset,
    #[error(transparent)]
    Malformed(#[from] chrono::ParseError),
}

/// Parse an RFC 3339 timestamp, keeping its UTC offset.
///
/// # Examples
///
/// ```
/// use statuspage::time::parse_timestamp;
///
/// let ts = parse_timestamp("2023-01-01T00:00:00Z").unwrap();
/// assert_eq!(ts.timestamp(), 1_672_531_200);
///
/// assert!(parse_timestamp("not-a-date").is_err());
/// assert!(parse_timestamp("").is_err());
/// assert!(parse_timestamp("2023-01-01 00:00:00Z").is_err());
/// ```
pub fn parse_timestamp(text: &str) -> Result<DateTime<FixedOffset>, TimestampError> {
    // chrono also takes a space or lowercase 't' separator and a lowercase 'z'
    if let Some(separator) = text.as_bytes().get(SEPARATOR_INDEX) {
        if *separator != b'T' {
            return Err(TimestampError::Separator);
        }
    }
    if text.ends_with('z') {
        return Err(TimestampError::Offset);
    }
    Ok(DateTime::parse_from_rfc3339(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_parse_utc() {
        let ts = parse_timestamp("2023-01-01T00:00:00Z").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_keeps_offset() {
        let ts = parse_timestamp("2024-02-10T08:30:00+01:00").unwrap();
        assert_eq!(ts.offset().local_minus_utc(), 3600);
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 2, 10, 7, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_fractional_seconds() {
        assert!(parse_timestamp("2024-03-01T10:00:00.250Z").is_ok());
    }

    #[test]
    fn test_reject_invalid() {
        assert!(parse_timestamp("not-a-date").is_err());
        assert!(parse_timestamp("").is_err());
        assert!(parse_timestamp("2024-03-01").is_err());
        assert!(parse_timestamp("2024-03-01 10:00:00").is_err());
        assert!(parse_timestamp("2024-03-01T10:00:00").is_err());
    }

    #[test]
    fn test_reject_relaxed_forms() {
        assert!(matches!(
            parse_timestamp("2024-03-01 10:00:00Z"),
            Err(TimestampError::Separator)
        ));
        assert!(matches!(
            parse_timestamp("2024-03-01t10:00:00z"),
            Err(TimestampError::Separator)
        ));
        assert!(matches!(
            parse_timestamp("2024-03-01T10:00:00z"),
            Err(TimestampError::Offset)
        ));
    }

    #[test]
    fn test_short_text_is_malformed() {
        assert!(matches!(
            parse_timestamp("2024-03"),
            Err(TimestampError::Malformed(_))
        ));
    }
}
