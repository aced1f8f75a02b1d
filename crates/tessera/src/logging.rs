//! # Logging
//!
//! Installs the process-wide `tracing` subscriber:
//!
//! - console output stamped `MM-DD-YYYY HH:MM:SS` in local time
//!   (UTC if the offset cannot be determined)
//! - `ERROR` events go to stderr, everything else to stdout
//! - the filter comes from `RUST_LOG` when set, otherwise from
//!   [`LoggingConfig::level`]
//! - every event that passes the filter is also appended to a
//!   [`LogHistory`] the application can inspect

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::{EngineError, EngineResult};

/// Timestamp layout used on the console.
pub type ConsoleTimer = OffsetTime<&'static [BorrowedFormatItem<'static>]>;

/// Creates the console timer: `MM-DD-YYYY HH:MM:SS` at the local offset.
#[must_use]
pub fn console_timer() -> ConsoleTimer {
    let format = format_description!("[month]-[day]-[year] [hour]:[minute]:[second]");
    let offset = time::UtcOffset::current_local_offset().unwrap_or(time::UtcOffset::UTC);
    OffsetTime::new(offset, format)
}

/// Installs the global subscriber and returns the history it feeds.
///
/// # Errors
///
/// Returns [`EngineError::Logging`] if the filter directive is invalid or a
/// global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> EngineResult<LogHistory> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| EngineError::Logging(format!("bad level {:?}: {e}", config.level)))?,
    };

    let history = LogHistory::new(config.history_limit);
    let console = tracing_subscriber::fmt::layer()
        .with_timer(console_timer())
        .with_target(false)
        .with_writer(std::io::stderr.with_max_level(Level::ERROR).or_else(std::io::stdout));

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(history.clone())
        .try_init()
        .map_err(|e| EngineError::Logging(e.to_string()))?;

    Ok(history)
}

/// One recorded log event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    /// Severity.
    pub level: Level,
    /// Rendered message, followed by any structured fields as `key=value`.
    pub message: String,
}

impl LogEntry {
    /// True for `ERROR` events.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.level == Level::ERROR
    }
}

/// Bounded in-memory log of recent events.
///
/// Cloning shares the same buffer. Used as a [`Layer`], it records every
/// event the subscriber lets through; when full, the oldest entry is dropped.
#[derive(Clone, Debug)]
pub struct LogHistory {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
    limit: usize,
}

impl LogHistory {
    /// Creates an empty history holding at most `limit` entries.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(limit.min(1024)))),
            limit,
        }
    }

    /// Appends an entry, evicting the oldest one if the history is full.
    pub fn push(&self, level: Level, message: impl Into<String>) {
        if self.limit == 0 {
            return;
        }
        let mut entries = self.entries.lock();
        while entries.len() >= self.limit {
            entries.pop_front();
        }
        entries.push_back(LogEntry {
            level,
            message: message.into(),
        });
    }

    /// Snapshot of the recorded entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().iter().cloned().collect()
    }

    /// Entries recorded at `ERROR` level.
    #[must_use]
    pub fn errors(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .iter()
            .filter(|entry| entry.is_error())
            .cloned()
            .collect()
    }

    /// Number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// True if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Maximum number of entries kept.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Drops all recorded entries.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl<S: Subscriber> Layer<S> for LogHistory {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.push(*event.metadata().level(), visitor.finish());
    }
}

/// Collects the `message` field plus the remaining fields of an event.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: Vec<String>,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields.join(" ")
        } else {
            format!("{} {}", self.message, self.fields.join(" "))
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={value}", field.name()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields.push(format!("{}={value:?}", field.name()));
        }
    }
}
