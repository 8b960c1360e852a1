//! # Logger Service
//!
//! This crate implements structured logging.
//!
//! ## Philosophy
//!
//! Logging is explicit and structured, not text-based or printf-style.
//! Components that emit diagnostics own a [`DiagnosticsLog`] and append
//! [`LogEntry`] values to it; tests inspect the log directly instead of
//! scraping output.

use core_types::ThreadId;

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Debug information
    Debug,
    /// Informational messages
    Info,
    /// Warnings
    Warn,
    /// Errors
    Error,
}

/// A structured log entry
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Source thread (if known)
    pub source: Option<ThreadId>,
    /// Log message
    pub message: String,
    /// Structured fields
    pub fields: Vec<(String, String)>,
}

impl LogEntry {
    /// Creates a new log entry
    pub fn new(level: LogLevel, message: String) -> Self {
        Self {
            level,
            source: None,
            message,
            fields: Vec::new(),
        }
    }

    /// Sets the source thread
    pub fn with_source(mut self, source: ThreadId) -> Self {
        self.source = Some(source);
        self
    }

    /// Adds a field to the log entry
    pub fn with_field(mut self, key: String, value: String) -> Self {
        self.fields.push((key, value));
        self
    }
}

/// In-memory diagnostics collector
///
/// Entries below `min_level` are dropped at append time.
#[derive(Debug, Default)]
pub struct DiagnosticsLog {
    entries: Vec<LogEntry>,
    min_level: Option<LogLevel>,
}

impl DiagnosticsLog {
    /// Creates a collector that keeps every entry
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            min_level: None,
        }
    }

    /// Creates a collector that keeps entries at or above `level`
    pub fn with_min_level(level: LogLevel) -> Self {
        Self {
            entries: Vec::new(),
            min_level: Some(level),
        }
    }

    /// Appends an entry, subject to the level filter
    pub fn push(&mut self, entry: LogEntry) {
        if let Some(min) = self.min_level {
            if entry.level < min {
                return;
            }
        }
        self.entries.push(entry);
    }

    /// Returns all collected entries
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Returns collected entries at exactly `level`
    pub fn entries_at(&self, level: LogLevel) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(move |e| e.level == level)
    }

    /// Discards all collected entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
