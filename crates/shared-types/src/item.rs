//! The normalized calendar item every sync job produces.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Time span of a calendar item.
///
/// Timed windows hold wall-clock times in `timezone`; conversion to an
/// absolute instant happens at the calendar boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimeWindow {
    Timed {
        start: NaiveDateTime,
        end: NaiveDateTime,
        timezone: String,
    },
    AllDay {
        start: NaiveDate,
        /// Exclusive, always the day after `start` for items built here.
        end: NaiveDate,
    },
}

impl TimeWindow {
    /// Fixed-duration slot starting at `start` local time.
    pub fn timed(start: NaiveDateTime, duration: Duration, timezone: &str) -> Self {
        TimeWindow::Timed {
            start,
            end: start + duration,
            timezone: timezone.to_string(),
        }
    }

    /// Single-day slot spanning `date` to the next calendar day.
    pub fn all_day(date: NaiveDate) -> Self {
        TimeWindow::AllDay {
            start: date,
            end: date + Duration::days(1),
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        match self {
            TimeWindow::Timed { start, .. } => start.date(),
            TimeWindow::AllDay { start, .. } => *start,
        }
    }

    pub fn is_all_day(&self) -> bool {
        matches!(self, TimeWindow::AllDay { .. })
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeWindow::Timed { start, timezone, .. } => {
                write!(f, "{} ({})", start.format("%Y-%m-%dT%H:%M"), timezone)
            }
            TimeWindow::AllDay { start, .. } => write!(f, "{}", start.format("%Y-%m-%d")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Confirmed,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Confirmed => "confirmed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
        }
    }
}

/// Calendar color code (Google's event palette uses "1" to "11").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTag(pub u8);

impl fmt::Display for CategoryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One item to insert into a target calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarItem {
    pub title: String,
    /// Line-oriented free text.
    pub body: String,
    pub window: TimeWindow,
    pub location: Option<String>,
    pub status: ItemStatus,
    pub visibility: Visibility,
    pub category: CategoryTag,
}

impl CalendarItem {
    /// Item with the flags every sync job publishes with.
    pub fn published(
        title: String,
        body: String,
        window: TimeWindow,
        location: Option<String>,
        category: CategoryTag,
    ) -> Self {
        Self {
            title,
            body,
            window,
            location: location.filter(|l| !l.is_empty()),
            status: ItemStatus::Confirmed,
            visibility: Visibility::Public,
            category,
        }
    }
}
