//! Domain types shared by the calendar sync jobs: the source records each
//! job reads, the calendar item they all produce, and the run results.

mod body;
pub mod category;
pub mod dates;
pub mod item;
pub mod record;
pub mod records;
pub mod stats;

pub use category::{CategoryTable, ManagementClass};
pub use item::{CalendarItem, CategoryTag, ItemStatus, TimeWindow, Visibility};
pub use record::{RecordFacets, SkipReason, SourceRecord};
pub use records::{BookingEvent, ManagementEvent, Release, Show};
pub use stats::{
    calendar_link, CollectionSnapshot, LoadOutcome, ResetOutcome, RunResult, SourceStats,
};
