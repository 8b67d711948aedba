use serde::Serialize;
use shared_types::RunResult;
use std::fmt;
use std::future::Future;

use crate::calendar_client::GoogleCalendar;
use crate::config::Config;
use crate::error::SyncError;
use crate::jobs::{run_job, JobKind};

#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum JobOutcome {
    Completed(RunResult),
    Failed { error: String },
}

#[derive(Debug, Serialize)]
pub struct JobEntry {
    pub job: String,
    #[serde(flatten)]
    pub outcome: JobOutcome,
}

/// Per-job outcomes of a full run.
#[derive(Debug, Default, Serialize)]
pub struct Scoreboard {
    pub entries: Vec<JobEntry>,
}

impl Scoreboard {
    pub fn succeeded(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, JobOutcome::Completed(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.entries.len() - self.succeeded()
    }
}

impl fmt::Display for Scoreboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "🎯 RESUMEN FINAL")?;
        writeln!(f, "{}", "=".repeat(50))?;
        for entry in &self.entries {
            match &entry.outcome {
                JobOutcome::Completed(result) => writeln!(
                    f,
                    "✅ {:<12} {} creados, {} errores, {} omitidos",
                    entry.job,
                    result.inserted(),
                    result.failed(),
                    result.skipped
                )?,
                JobOutcome::Failed { error } => {
                    writeln!(f, "❌ {:<12} falló: {}", entry.job, error)?
                }
            }
        }
        write!(
            f,
            "{} de {} sincronizaciones completadas",
            self.succeeded(),
            self.entries.len()
        )
    }
}

/// Runs `jobs` one after another. A failing job is recorded and the next
/// one still runs.
pub async fn run_sequence<F, Fut>(jobs: &[JobKind], mut run: F) -> Scoreboard
where
    F: FnMut(JobKind) -> Fut,
    Fut: Future<Output = Result<RunResult, SyncError>>,
{
    let mut scoreboard = Scoreboard::default();

    for &kind in jobs {
        let outcome = match run(kind).await {
            Ok(result) => {
                tracing::info!("{} sync finished", kind);
                JobOutcome::Completed(result)
            }
            Err(e) => {
                tracing::error!("{} sync failed: {}", kind, e);
                JobOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };
        scoreboard.entries.push(JobEntry {
            job: kind.to_string(),
            outcome,
        });
    }

    scoreboard
}

/// Authenticates and runs a single job against Google Calendar.
pub async fn run_one(kind: JobKind, config: &Config) -> Result<RunResult, SyncError> {
    let calendar = GoogleCalendar::connect(&config.credentials_path).await?;
    run_job(kind, config, &calendar).await
}

/// Runs every job in order, authenticating once per job.
pub async fn run_all(config: &Config) -> Scoreboard {
    run_sequence(&JobKind::ALL, |kind| run_one(kind, config)).await
}
