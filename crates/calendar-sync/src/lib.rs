//! Wipe-and-reload sync of Google Calendars from Postgres queries and JSON
//! listing APIs.

pub mod api;
pub mod calendar_client;
pub mod config;
pub mod db;
pub mod error;
pub mod jobs;
pub mod orchestrator;
pub mod setup;
pub mod source;
pub mod sync;

#[cfg(test)]
mod testing;

pub use error::{CalendarError, SyncError};
pub use jobs::JobKind;

/// Installs the process-wide rustls crypto provider. Needed once before
/// any TLS connection is made.
pub fn install_crypto_provider() -> anyhow::Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install crypto provider"))
}

/// `RUST_LOG`-driven tracing subscriber, `info` by default.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
