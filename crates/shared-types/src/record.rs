//! The per-source record contract: filter, transform and report facets.

use chrono::NaiveDate;
use thiserror::Error;

use crate::item::CalendarItem;

/// Why a source record was dropped before reaching the calendar.
///
/// Skips are never fatal: the record is counted and the run continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("invalid date `{value}` in `{field}`")]
    InvalidDate { field: &'static str, value: String },

    #[error("invalid time of day `{value}` in `{field}`")]
    InvalidTime { field: &'static str, value: String },
}

/// Dimensions a record contributes to the run statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFacets {
    pub artist: Option<String>,
    pub venue: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    /// The job's own grouping dimension (category, festival, release type).
    pub category: Option<String>,
    pub genre: Option<String>,
    pub date: Option<NaiveDate>,
}

/// A closed, job-specific source record.
///
/// `validate` is the record filter; `to_calendar_item` is the pure
/// transformer. Both report problems as a [`SkipReason`].
pub trait SourceRecord {
    /// Short identification for log lines, e.g. "Artist - Title".
    fn label(&self) -> String;

    /// Checks the mandatory fields and returns the record's nominal date.
    fn validate(&self) -> Result<NaiveDate, SkipReason>;

    /// Maps a valid record to its calendar item. `timezone` is the IANA
    /// zone timed windows are expressed in.
    fn to_calendar_item(&self, timezone: &str) -> Result<CalendarItem, SkipReason>;

    fn facets(&self) -> RecordFacets;
}

/// Non-empty trimmed value of an optional text field.
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// First present value among alternative fields.
pub(crate) fn first_present<'a>(values: &[&'a Option<String>]) -> Option<&'a str> {
    values.iter().find_map(|v| present(v))
}

/// Parses a mandatory date field into the record's nominal date.
pub(crate) fn require_date(
    field: &'static str,
    value: Option<&str>,
) -> Result<NaiveDate, SkipReason> {
    let value = value.ok_or(SkipReason::MissingField(field))?;
    crate::dates::parse_source_date(value).ok_or_else(|| SkipReason::InvalidDate {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_treats_blank_as_missing() {
        assert_eq!(present(&Some("  ".to_string())), None);
        assert_eq!(present(&Some(" Rock ".to_string())), Some("Rock"));
        assert_eq!(present(&None), None);
    }

    #[test]
    fn test_first_present_prefers_earlier_fields() {
        let a = None;
        let b = Some(String::new());
        let c = Some("third".to_string());
        let d = Some("fourth".to_string());
        assert_eq!(first_present(&[&a, &b, &c, &d]), Some("third"));
    }

    #[test]
    fn test_require_date_distinguishes_missing_and_invalid() {
        assert_eq!(
            require_date("show_date", None),
            Err(SkipReason::MissingField("show_date"))
        );
        assert_eq!(
            require_date("show_date", Some("soon")),
            Err(SkipReason::InvalidDate {
                field: "show_date",
                value: "soon".to_string()
            })
        );
        assert!(require_date("show_date", Some("2024-05-01")).is_ok());
    }
}
