//! Lenient parsing of the date strings the records API sends

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::ParseError;

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-like date or timestamp.
///
/// Accepts `2024-01-10`, `2024-01-10 09:30:00`, `2024-01-10T09:30:00.123`
/// and RFC 3339 with an offset (normalized to UTC). Everything else,
/// including `0000-00-00`, yields `None`.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(start_of_day(date));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Parse an optional raw field; absent and malformed both give `None`.
pub fn parse_optional(raw: Option<&str>) -> Option<NaiveDateTime> {
    raw.and_then(parse_datetime)
}

/// Strict `YYYY-MM-DD`, for filter bounds supplied by a user
pub fn parse_date_param(raw: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| ParseError::InvalidDate {
        value: raw.to_string(),
    })
}

pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Last representable millisecond of the day
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    let last = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    date.and_time(last)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_plain_date() {
        assert_eq!(parse_datetime("2024-02-05"), Some(start_of_day(ymd(2024, 2, 5))));
    }

    #[test]
    fn test_sql_timestamp() {
        let dt = parse_datetime("2024-02-05 14:30:00").unwrap();
        assert_eq!(dt.date(), ymd(2024, 2, 5));
        assert_eq!(dt.time(), NaiveTime::from_hms_opt(14, 30, 0).unwrap());
    }

    #[test]
    fn test_iso_with_fraction_and_offset() {
        assert!(parse_datetime("2024-02-05T14:30:00.250").is_some());
        let dt = parse_datetime("2024-02-05T01:00:00+05:30").unwrap();
        assert_eq!(dt.date(), ymd(2024, 2, 4));
    }

    #[test]
    fn test_garbage_is_none() {
        assert_eq!(parse_datetime(""), None);
        assert_eq!(parse_datetime("   "), None);
        assert_eq!(parse_datetime("0000-00-00"), None);
        assert_eq!(parse_datetime("yesterday"), None);
        assert_eq!(parse_datetime("2024-13-01"), None);
        assert_eq!(parse_optional(None), None);
    }

    #[test]
    fn test_day_bounds() {
        let d = ymd(2024, 2, 28);
        assert!(start_of_day(d) < end_of_day(d));
        assert_eq!(end_of_day(d).date(), d);
        assert!(end_of_day(d) < start_of_day(ymd(2024, 2, 29)));
    }

    #[test]
    fn test_date_param() {
        assert_eq!(parse_date_param("2024-02-01").unwrap(), ymd(2024, 2, 1));
        assert!(matches!(
            parse_date_param("01/02/2024"),
            Err(ParseError::InvalidDate { .. })
        ));
    }
}
