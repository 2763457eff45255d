//! 日期工具模块
//!
//! The API emits dates as `YYYY-MM-DD`, as full RFC 3339 timestamps
//! (`2024-01-01T00:00:00.000000Z`) or as MySQL datetimes
//! (`2024-01-01 10:00:00`). Form inputs only ever deal in `YYYY-MM-DD`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse any of the server's date shapes down to a calendar date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    // `2024-01-01T00:00:00` without offset, or anything with a date prefix.
    s.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, DATE_FORMAT).ok())
}

/// Normalize to `YYYY-MM-DD`; unparseable input is returned trimmed.
///
/// Idempotent: `normalize_date(normalize_date(x)) == normalize_date(x)`.
pub fn normalize_date(s: &str) -> String {
    match parse_date(s) {
        Some(d) => format_date(d),
        None => s.trim().to_string(),
    }
}

#[inline]
pub fn format_date(d: NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

/// `Some(true)` when `end` is strictly after `start`; `None` if either side
/// does not parse.
pub fn is_after(end: &str, start: &str) -> Option<bool> {
    Some(parse_date(end)? > parse_date(start)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_server_shape() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 31);
        assert_eq!(parse_date("2024-01-31"), expected);
        assert_eq!(parse_date("2024-01-31T00:00:00.000000Z"), expected);
        assert_eq!(parse_date("2024-01-31 23:59:59"), expected);
        assert_eq!(parse_date("2024-01-31T10:00:00"), expected);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("31/01/2024"), None);
    }

    #[test]
    fn normalize_is_stable() {
        let once = normalize_date("2024-03-05T12:00:00Z");
        assert_eq!(once, "2024-03-05");
        assert_eq!(normalize_date(&once), once);
        assert_eq!(normalize_date("  garbage "), "garbage");
    }

    #[test]
    fn same_day_is_not_after() {
        assert_eq!(is_after("2024-01-31", "2024-01-01"), Some(true));
        assert_eq!(is_after("2024-01-01", "2024-01-01"), Some(false));
        assert_eq!(is_after("2024-01-01", "2024-02-01"), Some(false));
        assert_eq!(is_after("", "2024-02-01"), None);
    }
}
