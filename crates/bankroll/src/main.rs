mod config;
mod sessions;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use bankroll_db::Database;
use bankroll_logging::{init_tracing, LogEvent, LogFormat, Logger};
use bankroll_sessions::{SessionStore, SessionsState};

use config::Config;
use sessions::{handle_sessions_command, CommandContext, SessionsAction};

/// File the event log is appended to when file logging is enabled.
const EVENTS_FILE_NAME: &str = "events.jsonl";

#[derive(Parser, Debug)]
#[command(
    name = "bankroll",
    about = "Track poker sessions and your bankroll",
    version,
    author
)]
struct Cli {
    /// Path to a bankroll.toml (default: ./bankroll.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the session database
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Log output format
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormatChoice>,

    /// Tracing level filter (overridden by RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: SessionsAction,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => Config::from_path(path)?,
        None => {
            let working_dir =
                std::env::current_dir().context("Failed to get current directory")?;
            Config::load(&working_dir)?.unwrap_or_default()
        }
    };

    let log_format = match cli.log_format {
        Some(choice) => choice.into(),
        None => config.log_format()?,
    };
    let log_level = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    let log_dir = config.log_dir();
    if let Some(ref dir) = log_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    }
    init_tracing(log_level, log_format, log_dir.as_deref());

    let logger = match log_dir {
        Some(ref dir) => Logger::with_file(log_format, &dir.join(EVENTS_FILE_NAME))
            .context("Failed to open event log")?,
        None => Logger::new(log_format),
    };

    let db = match cli.db.or(config.database) {
        Some(path) => {
            tracing::debug!("Opening database at {}", path.display());
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory {}", parent.display())
                })?;
            }
            Database::open_at(&path)
        }
        None => Database::open(),
    }
    .context("Failed to open session database")?;

    let mut state = SessionsState::new(SessionStore::new(db));
    if let Some(error) = state.last_error() {
        logger.log(&LogEvent::StoreUnreadable {
            error: error.to_string(),
        });
    }

    let ctx = CommandContext {
        currency: config.currency,
        logger,
    };

    handle_sessions_command(cli.command, &mut state, &ctx)
}
