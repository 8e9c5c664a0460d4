use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Structured log events for session bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    SessionSaved {
        id: String,
        location: String,
        stakes: String,
        duration: String,
        profit: f64,
    },
    SessionUpdated {
        id: String,
        profit: f64,
    },
    SessionDeleted {
        id: String,
        existed: bool,
    },
    SessionsCleared,
    /// The stored collection could not be read and was treated as empty
    StoreUnreadable {
        error: String,
    },
    OperationFailed {
        operation: String,
        error: String,
    },
}

impl LogEvent {
    /// The event as a JSON object stamped with the current time.
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }
}

/// Console rendering of events and tracing records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Logger for bankroll events - handles both console output and file logging
pub struct Logger {
    format: LogFormat,
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            file_writer: None,
        }
    }

    /// Also append every event as a JSON line to `log_path`.
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            file_writer: Some(Mutex::new(file)),
        })
    }

    pub fn log(&self, event: &LogEvent) {
        // The file sink is always JSON lines regardless of the console format.
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let json = event.with_timestamp();
                let _ = writeln!(file, "{}", json);
            }
        }

        if let Some(line) = self.render(event) {
            let _ = writeln!(std::io::stderr(), "{}", line);
        }
    }

    /// Console rendering of an event in the configured format
    pub fn render(&self, event: &LogEvent) -> Option<String> {
        match self.format {
            LogFormat::Json => serde_json::to_string(event).ok(),
            LogFormat::Pretty => Some(Self::render_pretty(event)),
            LogFormat::Compact => Some(Self::render_compact(event)),
        }
    }

    fn render_pretty(event: &LogEvent) -> String {
        match event {
            LogEvent::SessionSaved {
                id,
                location,
                stakes,
                duration,
                profit,
            } => format!(
                "{} {} {} @ {} ({}) {}",
                "✓".bright_green(),
                "Saved session".bold(),
                id.dimmed(),
                location,
                stakes,
                format!("{} / {}", Self::signed(*profit), duration).color(Self::profit_color(*profit))
            ),
            LogEvent::SessionUpdated { id, profit } => format!(
                "{} {} {} {}",
                "✓".bright_green(),
                "Updated session".bold(),
                id.dimmed(),
                Self::signed(*profit).color(Self::profit_color(*profit))
            ),
            LogEvent::SessionDeleted { id, existed: true } => format!(
                "{} {} {}",
                "✓".bright_green(),
                "Deleted session".bold(),
                id.dimmed()
            ),
            LogEvent::SessionDeleted { id, existed: false } => format!(
                "{} {} {}",
                "·".dimmed(),
                "No session with id".dimmed(),
                id
            ),
            LogEvent::SessionsCleared => {
                format!("{} {}", "✓".bright_green(), "Cleared all sessions".bold())
            }
            LogEvent::StoreUnreadable { error } => format!(
                "{} {} {}",
                "!".bright_yellow(),
                "Stored sessions could not be read:".bright_yellow(),
                error
            ),
            LogEvent::OperationFailed { operation, error } => format!(
                "{} {} {}",
                "✗".bright_red(),
                format!("{} failed:", operation).bright_red(),
                error
            ),
        }
    }

    fn render_compact(event: &LogEvent) -> String {
        let timestamp = chrono::Utc::now().format("%H:%M:%S");
        match event {
            LogEvent::SessionSaved { id, profit, .. } => {
                format!("[{}] session:saved:{} {}", timestamp, id, Self::signed(*profit))
            }
            LogEvent::SessionUpdated { id, profit } => {
                format!("[{}] session:updated:{} {}", timestamp, id, Self::signed(*profit))
            }
            LogEvent::SessionDeleted { id, existed } => {
                format!("[{}] session:deleted:{} existed={}", timestamp, id, existed)
            }
            LogEvent::SessionsCleared => format!("[{}] sessions:cleared", timestamp),
            LogEvent::StoreUnreadable { error } => {
                format!("[{}] store:unreadable {}", timestamp, error)
            }
            LogEvent::OperationFailed { operation, error } => {
                format!("[{}] error:{} {}", timestamp, operation, error)
            }
        }
    }

    fn signed(amount: f64) -> String {
        if amount > 0.0 {
            format!("+{:.2}", amount)
        } else {
            format!("{:.2}", amount)
        }
    }

    fn profit_color(amount: f64) -> colored::Color {
        if amount > 0.0 {
            colored::Color::BrightGreen
        } else if amount < 0.0 {
            colored::Color::BrightRed
        } else {
            colored::Color::White
        }
    }
}
