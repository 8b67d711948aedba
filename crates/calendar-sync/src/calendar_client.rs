use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use google_calendar3::api::{Event, EventDateTime, Scope};
use google_calendar3::hyper_rustls::HttpsConnector;
use google_calendar3::CalendarHub;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use shared_types::{CalendarItem, TimeWindow};
use std::path::Path;

use crate::config::TargetConfig;
use crate::error::{CalendarError, SyncError};

/// Events per page when listing; the API maximum.
pub const PAGE_SIZE: usize = 2500;

const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

/// Metadata of a target calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarMeta {
    pub id: String,
    pub summary: String,
    pub timezone: Option<String>,
}

/// An event that already exists in a calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteItem {
    pub id: String,
    pub title: Option<String>,
    pub start: Option<DateTime<Utc>>,
}

/// The calendar operations a sync job needs.
#[allow(async_fn_in_trait)]
pub trait CalendarService {
    /// Metadata of one calendar by ID.
    async fn calendar(&self, calendar_id: &str) -> Result<CalendarMeta, CalendarError>;

    /// Every calendar visible to the authenticated account.
    async fn calendars(&self) -> Result<Vec<CalendarMeta>, CalendarError>;

    /// Existing events ordered by start time, at most `limit` of them.
    async fn list_items(
        &self,
        calendar_id: &str,
        limit: usize,
    ) -> Result<Vec<RemoteItem>, CalendarError>;

    /// Creates an event and returns its ID.
    async fn insert_item(
        &self,
        calendar_id: &str,
        item: &CalendarItem,
    ) -> Result<String, CalendarError>;

    async fn delete_item(&self, calendar_id: &str, item_id: &str) -> Result<(), CalendarError>;
}

/// Finds the calendar a job should write to.
///
/// With `force_calendar_id` only the configured ID is tried. Otherwise a
/// failed ID lookup falls back to matching `calendar_name` against the
/// account's calendar list. Only a case-insensitive exact name match is
/// accepted, since the resolved calendar is wiped.
pub async fn resolve_calendar<C: CalendarService>(
    service: &C,
    target: &TargetConfig,
) -> Result<CalendarMeta, SyncError> {
    let by_id = service.calendar(&target.calendar_id).await;
    match by_id {
        Ok(meta) => {
            tracing::info!(
                "Using calendar '{}' (id: {}, timezone: {})",
                meta.summary,
                meta.id,
                meta.timezone.as_deref().unwrap_or("unknown")
            );
            return Ok(meta);
        }
        Err(e) if target.force_calendar_id => {
            tracing::error!("Configured calendar ID is not accessible: {}", e);
            return Err(SyncError::CalendarNotFound {
                id: target.calendar_id.clone(),
                name: target.calendar_name.clone(),
                visible: "not searched (force_calendar_id is set)".to_string(),
            });
        }
        Err(e) => {
            tracing::warn!(
                "Calendar ID {} not accessible ({}), searching by name '{}'",
                target.calendar_id,
                e,
                target.calendar_name
            );
        }
    }

    let wanted = target.calendar_name.trim().to_lowercase();
    if wanted.is_empty() {
        return Err(SyncError::CalendarNotFound {
            id: target.calendar_id.clone(),
            name: target.calendar_name.clone(),
            visible: "not searched (calendar_name is empty)".to_string(),
        });
    }

    let calendars = service
        .calendars()
        .await
        .map_err(|e| SyncError::CalendarNotFound {
            id: target.calendar_id.clone(),
            name: target.calendar_name.clone(),
            visible: format!("calendar list unavailable ({})", e),
        })?;

    let found = calendars
        .iter()
        .find(|c| c.summary.trim().to_lowercase() == wanted);

    match found {
        Some(meta) => {
            tracing::info!("Found calendar '{}' with ID: {}", meta.summary, meta.id);
            Ok(meta.clone())
        }
        None => Err(SyncError::CalendarNotFound {
            id: target.calendar_id.clone(),
            name: target.calendar_name.clone(),
            visible: calendars
                .iter()
                .map(|c| format!("{} ({})", c.summary, c.id))
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}

/// Google Calendar, authenticated with a service account.
pub struct GoogleCalendar {
    hub: CalendarHub<HttpsConnector<HttpConnector>>,
}

impl GoogleCalendar {
    pub async fn connect(credentials_path: &Path) -> Result<Self, SyncError> {
        if !credentials_path.exists() {
            return Err(SyncError::MissingCredentials(credentials_path.to_path_buf()));
        }

        let key = google_calendar3::yup_oauth2::read_service_account_key(credentials_path)
            .await
            .map_err(|e| SyncError::Auth(format!("failed to read service account key: {}", e)))?;

        let auth = google_calendar3::yup_oauth2::ServiceAccountAuthenticator::builder(key)
            .build()
            .await
            .map_err(|e| SyncError::Auth(format!("failed to build authenticator: {}", e)))?;

        auth.token(&[CALENDAR_SCOPE])
            .await
            .map_err(|e| SyncError::Auth(format!("failed to obtain access token: {}", e)))?;

        let connector = google_calendar3::hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()
            .map_err(|e| SyncError::Auth(format!("failed to load native TLS roots: {}", e)))?
            .https_or_http()
            .enable_http1()
            .build();

        let client = Client::builder(TokioExecutor::new()).build(connector);
        let hub = CalendarHub::new(client, auth);

        tracing::info!("Authenticated with service account");
        Ok(Self { hub })
    }
}

impl CalendarService for GoogleCalendar {
    async fn calendar(&self, calendar_id: &str) -> Result<CalendarMeta, CalendarError> {
        let (_, calendar) = self
            .hub
            .calendars()
            .get(calendar_id)
            .add_scope(Scope::Full)
            .doit()
            .await
            .map_err(|e| CalendarError::new("get calendar", calendar_id, e))?;

        Ok(CalendarMeta {
            id: calendar.id.unwrap_or_else(|| calendar_id.to_string()),
            summary: calendar.summary.unwrap_or_default(),
            timezone: calendar.time_zone,
        })
    }

    async fn calendars(&self) -> Result<Vec<CalendarMeta>, CalendarError> {
        let mut calendars = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut call = self.hub.calendar_list().list().add_scope(Scope::Full);
            if let Some(token) = &page_token {
                call = call.page_token(token);
            }
            let (_, list) = call
                .doit()
                .await
                .map_err(|e| CalendarError::new("list calendars", "account", e))?;

            calendars.extend(list.items.unwrap_or_default().into_iter().filter_map(|entry| {
                Some(CalendarMeta {
                    id: entry.id?,
                    summary: entry.summary.unwrap_or_default(),
                    timezone: entry.time_zone,
                })
            }));

            page_token = list.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        Ok(calendars)
    }

    async fn list_items(
        &self,
        calendar_id: &str,
        limit: usize,
    ) -> Result<Vec<RemoteItem>, CalendarError> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        while items.len() < limit {
            let page_size = (limit - items.len()).min(PAGE_SIZE) as i32;
            let mut call = self
                .hub
                .events()
                .list(calendar_id)
                .max_results(page_size)
                .single_events(true)
                .order_by("startTime")
                .add_scope(Scope::Full);
            if let Some(token) = &page_token {
                call = call.page_token(token);
            }
            let (_, events) = call
                .doit()
                .await
                .map_err(|e| CalendarError::new("list events", calendar_id, e))?;

            items.extend(
                events
                    .items
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(remote_item),
            );

            page_token = events.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        items.truncate(limit);
        Ok(items)
    }

    async fn insert_item(
        &self,
        calendar_id: &str,
        item: &CalendarItem,
    ) -> Result<String, CalendarError> {
        let event = to_event(item).map_err(|e| CalendarError::new("insert", &item.title, e))?;

        let (_, created) = self
            .hub
            .events()
            .insert(event, calendar_id)
            .add_scope(Scope::Full)
            .doit()
            .await
            .map_err(|e| CalendarError::new("insert", &item.title, e))?;

        Ok(created.id.unwrap_or_default())
    }

    async fn delete_item(&self, calendar_id: &str, item_id: &str) -> Result<(), CalendarError> {
        self.hub
            .events()
            .delete(calendar_id, item_id)
            .add_scope(Scope::Full)
            .doit()
            .await
            .map_err(|e| CalendarError::new("delete", item_id, e))?;
        Ok(())
    }
}

fn remote_item(event: Event) -> Option<RemoteItem> {
    let start = event.start.as_ref().and_then(|s| {
        s.date_time.or_else(|| {
            s.date
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        })
    });

    Some(RemoteItem {
        id: event.id?,
        title: event.summary,
        start,
    })
}

fn local_to_utc(naive: &NaiveDateTime, tz: Tz) -> Result<DateTime<Utc>, String> {
    tz.from_local_datetime(naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| format!("{} does not exist in {}", naive, tz))
}

/// Maps a calendar item to the API's event resource.
pub fn to_event(item: &CalendarItem) -> Result<Event, String> {
    let (start, end) = match &item.window {
        TimeWindow::Timed {
            start,
            end,
            timezone,
        } => {
            let tz: Tz = timezone
                .parse()
                .map_err(|_| format!("invalid timezone: {}", timezone))?;
            (
                EventDateTime {
                    date_time: Some(local_to_utc(start, tz)?),
                    time_zone: Some(timezone.clone()),
                    ..Default::default()
                },
                EventDateTime {
                    date_time: Some(local_to_utc(end, tz)?),
                    time_zone: Some(timezone.clone()),
                    ..Default::default()
                },
            )
        }
        TimeWindow::AllDay { start, end } => (
            EventDateTime {
                date: Some(*start),
                ..Default::default()
            },
            EventDateTime {
                date: Some(*end),
                ..Default::default()
            },
        ),
    };

    Ok(Event {
        summary: Some(item.title.clone()),
        description: Some(item.body.clone()),
        location: item.location.clone(),
        start: Some(start),
        end: Some(end),
        status: Some(item.status.as_str().to_string()),
        visibility: Some(item.visibility.as_str().to_string()),
        color_id: Some(item.category.to_string()),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeCalendar;
    use chrono::{Duration, NaiveDate};
    use shared_types::CategoryTag;
    use tokio_test::{assert_err, assert_ok};

    fn target(id: &str, name: &str, force: bool) -> TargetConfig {
        TargetConfig {
            calendar_id: id.to_string(),
            calendar_name: name.to_string(),
            force_calendar_id: force,
        }
    }

    #[test]
    fn test_timed_event_is_converted_to_utc() {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(22, 30, 0)
            .unwrap();
        let item = CalendarItem::published(
            "X - Y".to_string(),
            "body".to_string(),
            TimeWindow::timed(start, Duration::hours(2), "America/Argentina/Buenos_Aires"),
            None,
            CategoryTag(1),
        );

        let event = to_event(&item).unwrap();
        let start = event.start.unwrap();
        let end = event.end.unwrap();
        assert_eq!(start.date_time.unwrap().to_rfc3339(), "2024-05-02T01:30:00+00:00");
        assert_eq!(end.date_time.unwrap().to_rfc3339(), "2024-05-02T03:30:00+00:00");
        assert_eq!(start.time_zone.as_deref(), Some("America/Argentina/Buenos_Aires"));
        assert_eq!(event.status.as_deref(), Some("confirmed"));
        assert_eq!(event.visibility.as_deref(), Some("public"));
        assert_eq!(event.color_id.as_deref(), Some("1"));
        assert_eq!(event.location, None);
    }

    #[test]
    fn test_all_day_event_uses_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap();
        let item = CalendarItem::published(
            "B - A".to_string(),
            String::new(),
            TimeWindow::all_day(date),
            None,
            CategoryTag(6),
        );

        let event = to_event(&item).unwrap();
        assert_eq!(event.start.unwrap().date, Some(date));
        assert_eq!(event.end.unwrap().date, NaiveDate::from_ymd_opt(2024, 3, 9));
    }

    #[tokio::test]
    async fn test_resolve_by_id() {
        let calendar = FakeCalendar::new().with_calendar("live@group", "Live");
        let meta = assert_ok!(resolve_calendar(&calendar, &target("live@group", "Live", true)).await);
        assert_eq!(meta.summary, "Live");
    }

    #[tokio::test]
    async fn test_forced_id_does_not_search_by_name() {
        let calendar = FakeCalendar::new().with_calendar("other@group", "Booking");
        let err = assert_err!(resolve_calendar(&calendar, &target("gone@group", "Booking", true)).await);
        assert!(matches!(err, SyncError::CalendarNotFound { .. }));
    }

    #[tokio::test]
    async fn test_name_search_matches_exact_name_only() {
        let calendar = FakeCalendar::new()
            .with_calendar("a@group", "Booking Archive")
            .with_calendar("b@group", "booking");
        let meta = assert_ok!(resolve_calendar(&calendar, &target("gone@group", "Booking", false)).await);
        assert_eq!(meta.id, "b@group");

        let calendar = FakeCalendar::new().with_calendar("a@group", "Booking Archive");
        let err = assert_err!(resolve_calendar(&calendar, &target("gone@group", "Booking", false)).await);
        assert!(matches!(err, SyncError::CalendarNotFound { .. }));
    }

    #[tokio::test]
    async fn test_name_inside_another_name_is_not_a_match() {
        let calendar = FakeCalendar::new().with_calendar("d@group", "Deliveries");
        let err = assert_err!(resolve_calendar(&calendar, &target("typo@group", "Live", false)).await);
        assert!(matches!(err, SyncError::CalendarNotFound { .. }));
    }

    #[tokio::test]
    async fn test_empty_name_never_picks_a_calendar() {
        let calendar = FakeCalendar::new()
            .with_calendar("personal@group", "Personal")
            .with_items("personal@group", 7, Utc::now());
        let err = assert_err!(resolve_calendar(&calendar, &target("typo@group", "", false)).await);
        assert!(matches!(err, SyncError::CalendarNotFound { .. }));
        assert_eq!(calendar.items("personal@group").len(), 7);
    }

    #[tokio::test]
    async fn test_no_match_names_visible_calendars() {
        let calendar = FakeCalendar::new().with_calendar("l@group", "Live");
        let err = assert_err!(resolve_calendar(&calendar, &target("gone@group", "Releases", false)).await);
        match err {
            SyncError::CalendarNotFound { visible, .. } => assert_eq!(visible, "Live (l@group)"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
