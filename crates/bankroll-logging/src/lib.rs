//! # bankroll-logging
//!
//! Logging for the bankroll tracker.
//!
//! ## Key Types
//!
//! - [`Logger`] - Structured event logging
//! - [`LogEvent`] - Log event types
//! - [`LogFormat`] - Output formats (Pretty, JSON, Compact)
//!
//! ## Log Formats
//!
//! - `Pretty` - Human-readable colored output
//! - `JSON` - Structured JSON lines
//! - `Compact` - Minimal text output

mod events;

pub use events::{LogEvent, LogFormat, Logger};

use std::path::Path;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// File name used for the tracing log inside the log directory.
pub const LOG_FILE_NAME: &str = "bankroll.log";

/// Initialize tracing for the application.
///
/// `RUST_LOG` overrides `level` when set. When `log_dir` is given, every
/// record is also appended to `bankroll.log` there as JSON.
pub fn init_tracing(level: &str, format: LogFormat, log_dir: Option<&Path>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file_layer = log_dir.map(|dir| {
        let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_writer(appender)
    });

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(file_layer)
                .with(
                    fmt::layer()
                        .json()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        LogFormat::Pretty | LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(filter)
                .with(file_layer)
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }
}
