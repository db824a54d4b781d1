//! Logging Abstractions
//!
//! Structured log entries and a sink trait so hosts can receive core logs in
//! their own logging system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// A single structured log record forwarded to a [`LoggerSink`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub timestamp: DateTime<Utc>,
    pub target: String,
    pub message: String,
    pub fields: HashMap<String, String>,
    pub span_id: Option<String>,
}

impl LogEntry {
    pub fn new(level: LogLevel, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            timestamp: Utc::now(),
            target: target.into(),
            message: message.into(),
            fields: HashMap::new(),
            span_id: None,
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn with_span_id(mut self, span_id: impl Into<String>) -> Self {
        self.span_id = Some(span_id.into());
        self
    }
}

/// Host-provided destination for log entries.
#[async_trait::async_trait]
pub trait LoggerSink: Send + Sync {
    async fn log(&self, entry: LogEntry) -> Result<()>;

    async fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn min_level(&self) -> LogLevel {
        LogLevel::Info
    }
}
