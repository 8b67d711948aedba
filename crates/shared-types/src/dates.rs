//! Lenient parsing of the date and time strings sources hand us.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Calendar date of a source timestamp.
///
/// Accepts plain dates, RFC 3339 instants and Postgres' text rendering of
/// `timestamp`/`timestamptz`. Instants with an offset are read as their UTC
/// date.
pub fn parse_source_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }

    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(dt.with_timezone(&Utc).date_naive());
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Time of day from an "HH:MM" style field.
///
/// Trailing text after the minutes ("21:30hs", "21:30:00") is ignored.
pub fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    let mut parts = raw.trim().split(':');
    let hours: u32 = parts.next()?.trim().parse().ok()?;
    let minutes: String = parts
        .next()?
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    let minutes: u32 = minutes.parse().ok()?;

    NaiveTime::from_hms_opt(hours, minutes, 0)
}

/// Short Argentine date, `d/m/yyyy`.
pub fn format_short_date(date: NaiveDate) -> String {
    date.format("%-d/%-m/%Y").to_string()
}

/// Integer with comma thousands separators.
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if value < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_plain_date() {
        assert_eq!(parse_source_date("2024-05-01"), Some(date(2024, 5, 1)));
        assert_eq!(parse_source_date("  2024-05-01 "), Some(date(2024, 5, 1)));
    }

    #[test]
    fn test_parse_rfc3339_uses_utc_date() {
        assert_eq!(
            parse_source_date("2024-05-01T03:00:00.000Z"),
            Some(date(2024, 5, 1))
        );
        assert_eq!(
            parse_source_date("2024-05-01T22:00:00-03:00"),
            Some(date(2024, 5, 2))
        );
    }

    #[test]
    fn test_parse_postgres_text() {
        assert_eq!(
            parse_source_date("2024-05-01 00:00:00+00"),
            Some(date(2024, 5, 1))
        );
        assert_eq!(
            parse_source_date("2024-05-01 21:00:00"),
            Some(date(2024, 5, 1))
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_source_date(""), None);
        assert_eq!(parse_source_date("próximamente"), None);
        assert_eq!(parse_source_date("2024-13-45"), None);
    }

    #[test]
    fn test_parse_time_of_day() {
        assert_eq!(parse_time_of_day("22:30"), NaiveTime::from_hms_opt(22, 30, 0));
        assert_eq!(parse_time_of_day("21:00:00"), NaiveTime::from_hms_opt(21, 0, 0));
        assert_eq!(parse_time_of_day("21:15hs"), NaiveTime::from_hms_opt(21, 15, 0));
        assert_eq!(parse_time_of_day("21"), None);
        assert_eq!(parse_time_of_day("25:00"), None);
    }

    #[test]
    fn test_format_short_date() {
        assert_eq!(format_short_date(date(2024, 5, 1)), "1/5/2024");
        assert_eq!(format_short_date(date(2024, 12, 25)), "25/12/2024");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(12000), "12,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
        assert_eq!(group_thousands(-4500), "-4,500");
    }
}
