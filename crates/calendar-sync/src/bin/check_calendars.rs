use anyhow::Result;
use calendar_sync::calendar_client::{resolve_calendar, CalendarService, GoogleCalendar};
use calendar_sync::config::Config;
use calendar_sync::setup::setup_instructions;
use calendar_sync::{JobKind, SyncError};
use clap::Parser;
use shared_types::calendar_link;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "check-calendars")]
#[command(about = "Resolve every configured calendar and show what it currently holds")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(
        short,
        long,
        env = "CALENDAR_SYNC_CONFIG",
        default_value = "calendar-sync.toml"
    )]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    calendar_sync::install_crypto_provider()?;
    dotenvy::dotenv().ok();
    calendar_sync::init_tracing();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    let calendar = match GoogleCalendar::connect(&config.credentials_path).await {
        Ok(calendar) => calendar,
        Err(SyncError::MissingCredentials(_)) => {
            println!("{}", setup_instructions(&config));
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let visible = calendar.calendars().await?;
    println!("Calendars visible to the service account: {}", visible.len());
    for meta in &visible {
        println!("  • {} ({})", meta.summary, meta.id);
    }
    println!();

    for kind in JobKind::ALL {
        let Ok(target) = kind.target(&config) else {
            println!("⚪ {}: not configured", kind);
            continue;
        };

        match resolve_calendar(&calendar, target).await {
            Ok(meta) => {
                let items = calendar
                    .list_items(&meta.id, config.max_list_items)
                    .await
                    .map(|items| items.len().to_string())
                    .unwrap_or_else(|e| format!("unavailable ({})", e));
                println!("✅ {}: {}", kind, meta.summary);
                println!("   ID:       {}", meta.id);
                println!(
                    "   Timezone: {}",
                    meta.timezone.as_deref().unwrap_or("unknown")
                );
                println!("   Events:   {}", items);
                println!("   URL:      {}", calendar_link(&meta.id));
            }
            Err(e) => println!("❌ {}: {}", kind, e),
        }
    }

    Ok(())
}
