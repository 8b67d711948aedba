//! In-memory calendar and source doubles for tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use shared_types::{CalendarItem, SourceRecord};

use crate::calendar_client::{CalendarMeta, CalendarService, RemoteItem};
use crate::error::{CalendarError, SyncError};
use crate::source::{SourceBatch, SourceReader};

/// A source that hands out a fixed batch.
pub struct StaticSource<R> {
    batch: SourceBatch<R>,
}

impl<R> StaticSource<R> {
    pub fn new(records: Vec<R>) -> Self {
        Self::from_batch(SourceBatch::new(records))
    }

    pub fn from_batch(batch: SourceBatch<R>) -> Self {
        Self { batch }
    }
}

impl<R: SourceRecord + Clone> SourceReader for StaticSource<R> {
    type Record = R;

    fn describe(&self) -> String {
        "static records".to_string()
    }

    async fn read(&self) -> Result<SourceBatch<R>, SyncError> {
        Ok(self.batch.clone())
    }
}

#[derive(Default)]
struct State {
    items: BTreeMap<String, Vec<RemoteItem>>,
    inserted: Vec<CalendarItem>,
    next_id: usize,
}

#[derive(Default)]
pub struct FakeCalendar {
    calendars: Vec<CalendarMeta>,
    failing_deletes: HashSet<String>,
    failing_inserts: HashSet<String>,
    state: Mutex<State>,
}

impl FakeCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_calendar(mut self, id: &str, summary: &str) -> Self {
        self.calendars.push(CalendarMeta {
            id: id.to_string(),
            summary: summary.to_string(),
            timezone: Some("America/Argentina/Buenos_Aires".to_string()),
        });
        self
    }

    /// Seeds `count` events with IDs `evt-0`, `evt-1`, ...
    pub fn with_items(self, calendar_id: &str, count: usize, start: DateTime<Utc>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let items = state.items.entry(calendar_id.to_string()).or_default();
            items.extend((0..count).map(|i| RemoteItem {
                id: format!("evt-{}", i),
                title: Some(format!("Old {}", i)),
                start: Some(start),
            }));
        }
        self
    }

    pub fn failing_delete(mut self, item_id: &str) -> Self {
        self.failing_deletes.insert(item_id.to_string());
        self
    }

    pub fn failing_insert(mut self, title: &str) -> Self {
        self.failing_inserts.insert(title.to_string());
        self
    }

    pub fn items(&self, calendar_id: &str) -> Vec<RemoteItem> {
        let state = self.state.lock().unwrap();
        state.items.get(calendar_id).cloned().unwrap_or_default()
    }

    pub fn inserted(&self) -> Vec<CalendarItem> {
        self.state.lock().unwrap().inserted.clone()
    }
}

impl CalendarService for FakeCalendar {
    async fn calendar(&self, calendar_id: &str) -> Result<CalendarMeta, CalendarError> {
        self.calendars
            .iter()
            .find(|c| c.id == calendar_id)
            .cloned()
            .ok_or_else(|| CalendarError::new("get calendar", calendar_id, "404 Not Found"))
    }

    async fn calendars(&self) -> Result<Vec<CalendarMeta>, CalendarError> {
        Ok(self.calendars.clone())
    }

    async fn list_items(
        &self,
        calendar_id: &str,
        limit: usize,
    ) -> Result<Vec<RemoteItem>, CalendarError> {
        let mut items = self.items(calendar_id);
        items.truncate(limit);
        Ok(items)
    }

    async fn insert_item(
        &self,
        calendar_id: &str,
        item: &CalendarItem,
    ) -> Result<String, CalendarError> {
        if self.failing_inserts.contains(&item.title) {
            return Err(CalendarError::new("insert", &item.title, "500 Backend Error"));
        }

        let mut state = self.state.lock().unwrap();
        let id = format!("new-{}", state.next_id);
        state.next_id += 1;
        let start = item
            .window
            .start_date()
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc());
        state
            .items
            .entry(calendar_id.to_string())
            .or_default()
            .push(RemoteItem {
                id: id.clone(),
                title: Some(item.title.clone()),
                start,
            });
        state.inserted.push(item.clone());
        Ok(id)
    }

    async fn delete_item(&self, calendar_id: &str, item_id: &str) -> Result<(), CalendarError> {
        if self.failing_deletes.contains(item_id) {
            return Err(CalendarError::new("delete", item_id, "410 Gone"));
        }

        let mut state = self.state.lock().unwrap();
        let items = state.items.entry(calendar_id.to_string()).or_default();
        items.retain(|i| i.id != item_id);
        Ok(())
    }
}
