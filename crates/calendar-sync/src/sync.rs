//! The clear-and-reload routine shared by every job.
//!
//! read -> filter/transform -> reset the target calendar -> load -> report.
//! Deletions and insertions are strictly sequential and best-effort.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use shared_types::{
    CalendarItem, CollectionSnapshot, LoadOutcome, RecordFacets, ResetOutcome, RunResult,
    SourceRecord, SourceStats,
};

use crate::calendar_client::{CalendarMeta, CalendarService};
use crate::error::SyncError;
use crate::jobs::JobKind;
use crate::source::SourceReader;

const DELETE_PROGRESS_EVERY: usize = 50;
const INSERT_PROGRESS_EVERY: usize = 10;

/// Per-run parameters of [`sync_collection`].
#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub job: JobKind,
    pub timezone: String,
    pub max_list_items: usize,
}

/// Valid items and their facets, plus the number of records dropped.
#[derive(Debug, Default)]
pub struct Prepared {
    pub items: Vec<CalendarItem>,
    pub facets: Vec<RecordFacets>,
    pub skipped: usize,
}

/// Applies the record filter and the transformer. Records that fail
/// either are logged and counted as skipped.
pub fn prepare<R: SourceRecord>(records: &[R], timezone: &str) -> Prepared {
    let mut prepared = Prepared::default();

    for record in records {
        let item = record
            .validate()
            .and_then(|_| record.to_calendar_item(timezone));
        match item {
            Ok(item) => {
                prepared.items.push(item);
                prepared.facets.push(record.facets());
            }
            Err(reason) => {
                tracing::warn!("Skipping '{}': {}", record.label(), reason);
                prepared.skipped += 1;
            }
        }
    }

    prepared
}

/// Deletes every listed event in the calendar, one at a time.
pub async fn reset_collection<C: CalendarService>(
    calendar: &C,
    calendar_id: &str,
    max_list_items: usize,
) -> Result<ResetOutcome, SyncError> {
    let existing = calendar.list_items(calendar_id, max_list_items).await?;
    let mut outcome = ResetOutcome {
        listed: existing.len(),
        ..Default::default()
    };
    tracing::info!("Found {} existing events to delete", outcome.listed);

    for (index, item) in existing.iter().enumerate() {
        match calendar.delete_item(calendar_id, &item.id).await {
            Ok(()) => outcome.deleted += 1,
            Err(e) => {
                tracing::warn!(
                    "Failed to delete '{}': {}",
                    item.title.as_deref().unwrap_or(&item.id),
                    e
                );
                outcome.failed += 1;
            }
        }

        if (index + 1) % DELETE_PROGRESS_EVERY == 0 {
            tracing::info!("Deleted {}/{} events", index + 1, outcome.listed);
        }
    }

    tracing::info!(
        "Reset complete: {} deleted, {} failed",
        outcome.deleted,
        outcome.failed
    );
    Ok(outcome)
}

/// Inserts the items in order. A failed insert never stops the loop.
pub async fn load_items<C: CalendarService>(
    calendar: &C,
    calendar_id: &str,
    items: &[CalendarItem],
) -> LoadOutcome {
    let mut outcome = LoadOutcome::default();

    for (index, item) in items.iter().enumerate() {
        match calendar.insert_item(calendar_id, item).await {
            Ok(id) => {
                tracing::debug!("Created '{}' ({}) at {}", item.title, id, item.window);
                outcome.inserted += 1;
            }
            Err(e) => {
                tracing::warn!("Failed to create '{}': {}", item.title, e);
                outcome.failed += 1;
            }
        }

        if (index + 1) % INSERT_PROGRESS_EVERY == 0 {
            tracing::info!("Created {}/{} events", index + 1, items.len());
        }
    }

    tracing::info!(
        "Load complete: {} created, {} failed",
        outcome.inserted,
        outcome.failed
    );
    outcome
}

/// Fetches the calendar metadata and events again after loading.
pub async fn read_back<C: CalendarService>(
    calendar: &C,
    calendar_id: &str,
    max_list_items: usize,
    now: DateTime<Utc>,
) -> Option<CollectionSnapshot> {
    let read = async {
        let meta = calendar.calendar(calendar_id).await?;
        let items = calendar.list_items(calendar_id, max_list_items).await?;
        Ok::<_, SyncError>((meta, items))
    };

    match read.await {
        Ok((meta, items)) => {
            let past = items
                .iter()
                .filter(|i| i.start.is_some_and(|start| start < now))
                .count();
            Some(CollectionSnapshot {
                summary: meta.summary,
                timezone: meta.timezone,
                items: items.len(),
                past,
                upcoming: items.len() - past,
            })
        }
        Err(e) => {
            tracing::warn!("Could not read back calendar {}: {}", calendar_id, e);
            None
        }
    }
}

/// Replaces the whole content of `target` with the records of `source`.
pub async fn sync_collection<C, S>(
    calendar: &C,
    target: &CalendarMeta,
    source: &S,
    plan: &SyncPlan,
    now: DateTime<Utc>,
) -> Result<RunResult, SyncError>
where
    C: CalendarService,
    S: SourceReader,
{
    tracing::info!("[{}] Reading {}", plan.job, source.describe());
    let batch = source.read().await?;
    tracing::info!("[{}] {} source records", plan.job, batch.total());

    let prepared = prepare(&batch.records, &plan.timezone);
    let skipped = prepared.skipped + batch.malformed;
    tracing::info!(
        "[{}] {} valid records, {} skipped",
        plan.job,
        prepared.items.len(),
        skipped
    );

    let today = plan
        .timezone
        .parse::<Tz>()
        .map(|tz| now.with_timezone(&tz).date_naive())
        .unwrap_or_else(|_| now.date_naive());

    let mut result = RunResult {
        job: plan.job.to_string(),
        calendar_id: target.id.clone(),
        category_label: plan.job.category_label().to_string(),
        source_records: batch.total(),
        skipped,
        stats: SourceStats::collect(prepared.facets, today),
        ..Default::default()
    };

    if prepared.items.is_empty() && plan.job.keeps_calendar_when_empty() {
        tracing::warn!(
            "[{}] No valid records, leaving calendar '{}' untouched",
            plan.job,
            target.summary
        );
        result.note = Some("Sin registros válidos: el calendario no se modificó".to_string());
        return Ok(result);
    }

    tracing::info!("[{}] Clearing calendar '{}'", plan.job, target.summary);
    result.reset = reset_collection(calendar, &target.id, plan.max_list_items).await?;

    tracing::info!(
        "[{}] Creating {} events",
        plan.job,
        prepared.items.len()
    );
    result.load = load_items(calendar, &target.id, &prepared.items).await;

    result.snapshot = read_back(calendar, &target.id, plan.max_list_items, now).await;
    Ok(result)
}
