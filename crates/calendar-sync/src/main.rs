use anyhow::{Context, Result};
use calendar_sync::config::Config;
use calendar_sync::orchestrator::{run_all, run_one, JobOutcome};
use calendar_sync::setup::setup_instructions;
use calendar_sync::JobKind;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "calendar-sync")]
#[command(about = "Wipe and reload the Live, Management, Booking and Releases calendars")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(
        short,
        long,
        env = "CALENDAR_SYNC_CONFIG",
        default_value = "calendar-sync.toml",
        global = true
    )]
    config: PathBuf,

    /// Print results as JSON instead of the text report
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run every job in order and print a scoreboard (default)
    All,
    /// Shows from the live listing API
    Live,
    /// Management events from Postgres
    Management,
    /// Booking events from Postgres
    Booking,
    /// Releases from the releases API
    Releases,
    /// Write an example configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn write_example_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        println!(
            "{} already exists, not overwriting (use --force)",
            path.display()
        );
        return Ok(());
    }
    std::fs::write(path, Config::example_toml()?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote example configuration to {}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    calendar_sync::install_crypto_provider()?;
    dotenvy::dotenv().ok();
    calendar_sync::init_tracing();

    let cli = Cli::parse();

    let job = match cli.command.unwrap_or(Command::All) {
        Command::Init { force } => return write_example_config(&cli.config, force),
        Command::All => None,
        Command::Live => Some(JobKind::Live),
        Command::Management => Some(JobKind::Management),
        Command::Booking => Some(JobKind::Booking),
        Command::Releases => Some(JobKind::Releases),
    };

    let config = Config::load(&cli.config).with_context(|| {
        format!(
            "Could not load {} (run `calendar-sync init` to create one)",
            cli.config.display()
        )
    })?;

    if !config.credentials_path.exists() {
        println!("{}", setup_instructions(&config));
        return Ok(());
    }

    match job {
        None => {
            let scoreboard = run_all(&config).await;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&scoreboard)?);
            } else {
                for entry in &scoreboard.entries {
                    if let JobOutcome::Completed(result) = &entry.outcome {
                        println!("{}\n", result);
                    }
                }
                println!("{}", scoreboard);
            }
        }
        Some(kind) => match run_one(kind, &config).await {
            Ok(result) => {
                if cli.json {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                } else {
                    println!("{}", result);
                }
            }
            Err(e) => {
                tracing::error!("{} sync failed: {}", kind, e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}
