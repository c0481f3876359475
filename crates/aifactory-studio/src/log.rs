//! User-visible activity log.
//!
//! The log keeps the most recent entries only. Every entry is also emitted as
//! a `tracing` event at the matching level.

use std::collections::VecDeque;

use chrono::{DateTime, Local};

/// Maximum number of entries kept.
pub const LOG_CAPACITY: usize = 50;

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Progress information.
    Info,
    /// An operation completed.
    Success,
    /// Needs the user's attention.
    Warning,
    /// An operation failed.
    Error,
}

impl LogLevel {
    /// Short label for display.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "ok",
            Self::Warning => "warn",
            Self::Error => "error",
        }
    }
}

/// One log entry.
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// When the entry was recorded.
    pub time: DateTime<Local>,
    /// Severity.
    pub level: LogLevel,
    /// Message text.
    pub message: String,
}

/// Bounded activity log.
#[derive(Debug, Default)]
pub struct ActivityLog {
    entries: VecDeque<LogEntry>,
}

impl ActivityLog {
    /// Record an entry, dropping the oldest one when full.
    pub fn push(&mut self, level: LogLevel, message: impl Into<String>) {
        let message = message.into();

        match level {
            LogLevel::Info | LogLevel::Success => tracing::info!(kind = level.as_str(), "{message}"),
            LogLevel::Warning => tracing::warn!("{message}"),
            LogLevel::Error => tracing::error!("{message}"),
        }

        if self.entries.len() == LOG_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            time: Local::now(),
            level,
            message,
        });
    }

    /// Entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Most recent entry.
    #[must_use]
    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    /// Whether any entry at `level` contains `needle`.
    #[must_use]
    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.level == level && e.message.contains(needle))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
