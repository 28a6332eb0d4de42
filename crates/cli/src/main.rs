mod cli;
mod load;
mod render;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use shiftgrid_core::config::{load_dotenv, Config};
use shiftgrid_recurrence::DateWindow;
use shiftgrid_schedule::{InMemoryStore, ScheduleService, StaticIdentity};
use tracing::{debug, warn};

use crate::cli::{CliArgs, Command, Format};
use crate::load::{check_task, load_task};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    load_dotenv();
    let config = Config::from_env();
    config.log_summary();

    let args = CliArgs::parse();
    let identity = match &args.user {
        Some(name) => StaticIdentity::signed_in(name.clone(), name.clone()),
        None => StaticIdentity::anonymous(),
    };
    let service = ScheduleService::new(Arc::new(InMemoryStore::new()), Arc::new(identity), &config);

    match &args.command {
        Command::Check { file } => {
            let task = load_task(file)?;
            let problems = check_task(&task);
            if args.format == Format::Json {
                println!("{}", serde_json::json!({ "valid": problems.is_empty(), "problems": problems }));
            } else if problems.is_empty() {
                println!("{}: ok", file.display());
            } else {
                for problem in &problems {
                    println!("{}: {problem}", file.display());
                }
            }
            Ok(if problems.is_empty() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }

        Command::Expand { file, from, to } => {
            let task = load_task(file)?;
            let window = match (from, to) {
                (None, None) => None,
                (from, to) => {
                    let start = from.unwrap_or(task.pattern.start_date);
                    let end = match to {
                        Some(end) => *end,
                        None => DateWindow::horizon(start, config.schedule.horizon_days).end,
                    };
                    Some(DateWindow::new(start, end))
                }
            };
            debug!(?window, "expanding {}", file.display());

            let expansion = service
                .create_series(&task, window)
                .await
                .with_context(|| format!("failed to expand {}", file.display()))?;
            match args.format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&expansion)?),
                Format::Text => print!("{}", render::expansion_text(&expansion)),
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Grid { files, week } => {
            for file in files {
                let task = load_task(file)?;
                let expansion = service
                    .create_series(&task, None)
                    .await
                    .with_context(|| format!("failed to expand {}", file.display()))?;
                if expansion.indefinite {
                    warn!(
                        file = %file.display(),
                        horizon_days = config.schedule.horizon_days,
                        "open-ended series expanded only to the configured horizon"
                    );
                }
            }

            let entries = service.week_entries(*week).await?;
            let grid = entries.grid();
            match args.format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&grid)?),
                Format::Text => print!("{}", render::grid_text(&grid)),
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
