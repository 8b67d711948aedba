use chrono::Utc;
use shared_types::{BookingEvent, ManagementEvent, Release, RunResult, Show};
use std::fmt;

use crate::api::ApiSource;
use crate::calendar_client::{resolve_calendar, CalendarService};
use crate::config::{
    ApiJobConfig, Config, DbJobConfig, TargetConfig, DEFAULT_BOOKING_QUERY,
    DEFAULT_MANAGEMENT_QUERY,
};
use crate::db::DbSource;
use crate::error::SyncError;
use crate::source::SourceReader;
use crate::sync::{sync_collection, SyncPlan};

/// The four sync jobs, in the order a full run executes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    Live,
    Management,
    Booking,
    Releases,
}

impl JobKind {
    pub const ALL: [JobKind; 4] = [
        JobKind::Live,
        JobKind::Management,
        JobKind::Booking,
        JobKind::Releases,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            JobKind::Live => "Live",
            JobKind::Management => "Management",
            JobKind::Booking => "Booking",
            JobKind::Releases => "Releases",
        }
    }

    /// Config table holding this job's settings.
    pub fn table(&self) -> &'static str {
        match self {
            JobKind::Live => "live",
            JobKind::Management => "management",
            JobKind::Booking => "booking",
            JobKind::Releases => "releases",
        }
    }

    /// Report label of the job's grouping dimension.
    pub fn category_label(&self) -> &'static str {
        match self {
            JobKind::Live => "Categorías",
            JobKind::Management => "Festivales",
            JobKind::Booking => "Categorías",
            JobKind::Releases => "Tipos",
        }
    }

    /// Releases never wipe their calendar when the API returns nothing
    /// usable.
    pub fn keeps_calendar_when_empty(&self) -> bool {
        matches!(self, JobKind::Releases)
    }

    pub fn target<'a>(&self, config: &'a Config) -> Result<&'a TargetConfig, SyncError> {
        let target = match self {
            JobKind::Live => config.live.as_ref().map(|j| &j.target),
            JobKind::Management => config.management.as_ref().map(|j| &j.target),
            JobKind::Booking => config.booking.as_ref().map(|j| &j.target),
            JobKind::Releases => config.releases.as_ref().map(|j| &j.target),
        };
        target.ok_or_else(|| self.not_configured())
    }

    fn not_configured(&self) -> SyncError {
        SyncError::Config(format!("no [{}] table in the configuration", self.table()))
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn api_job(kind: JobKind, job: &Option<ApiJobConfig>) -> Result<&ApiJobConfig, SyncError> {
    job.as_ref().ok_or_else(|| kind.not_configured())
}

fn db_job(kind: JobKind, job: &Option<DbJobConfig>) -> Result<&DbJobConfig, SyncError> {
    job.as_ref().ok_or_else(|| kind.not_configured())
}

async fn run_with<C, S>(
    kind: JobKind,
    config: &Config,
    calendar: &C,
    target: &TargetConfig,
    source: S,
) -> Result<RunResult, SyncError>
where
    C: CalendarService,
    S: SourceReader,
{
    let meta = resolve_calendar(calendar, target).await?;
    let plan = SyncPlan {
        job: kind,
        timezone: config.timezone.clone(),
        max_list_items: config.max_list_items,
    };
    sync_collection(calendar, &meta, &source, &plan, Utc::now()).await
}

/// Runs one job end to end against `calendar`.
pub async fn run_job<C: CalendarService>(
    kind: JobKind,
    config: &Config,
    calendar: &C,
) -> Result<RunResult, SyncError> {
    tracing::info!("Starting {} sync", kind);

    match kind {
        JobKind::Live => {
            let job = api_job(kind, &config.live)?;
            let source = ApiSource::<Show>::new(job);
            run_with(kind, config, calendar, &job.target, source).await
        }
        JobKind::Management => {
            let job = db_job(kind, &config.management)?;
            let source = DbSource::<ManagementEvent>::new(
                config.database_url_for(job)?,
                job.query_or(DEFAULT_MANAGEMENT_QUERY),
            );
            run_with(kind, config, calendar, &job.target, source).await
        }
        JobKind::Booking => {
            let job = db_job(kind, &config.booking)?;
            let source = DbSource::<BookingEvent>::new(
                config.database_url_for(job)?,
                job.query_or(DEFAULT_BOOKING_QUERY),
            );
            run_with(kind, config, calendar, &job.target, source).await
        }
        JobKind::Releases => {
            let job = api_job(kind, &config.releases)?;
            let source = ApiSource::<Release>::new(job);
            run_with(kind, config, calendar, &job.target, source).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeCalendar;
    use tokio_test::assert_err;

    #[test]
    fn test_all_runs_in_fixed_order() {
        let names: Vec<&str> = JobKind::ALL.iter().map(JobKind::name).collect();
        assert_eq!(names, vec!["Live", "Management", "Booking", "Releases"]);
    }

    #[test]
    fn test_only_releases_keep_calendar_when_empty() {
        let keeping: Vec<JobKind> = JobKind::ALL
            .into_iter()
            .filter(JobKind::keeps_calendar_when_empty)
            .collect();
        assert_eq!(keeping, vec![JobKind::Releases]);
    }

    #[tokio::test]
    async fn test_unconfigured_job_is_a_config_error() {
        let mut config = Config::example();
        config.booking = None;
        let calendar = FakeCalendar::new();

        let err = assert_err!(run_job(JobKind::Booking, &config, &calendar).await);
        assert!(matches!(err, SyncError::Config(_)));
        assert!(JobKind::Booking.target(&config).is_err());
        assert!(JobKind::Live.target(&config).is_ok());
    }
}
