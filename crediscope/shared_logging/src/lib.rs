#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! Structured JSON-lines logging shared by the verdict pipeline and its CLI.

use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::Result;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Log severity level, ordered from least to most severe.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Debug information.
    Debug,
    /// Informational events.
    Info,
    /// Warning indicator.
    Warn,
    /// Error indicator.
    Error,
}

impl LogLevel {
    /// Parses a level name (`debug`, `info`, `warn`/`warning`, `error`).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// Structured log record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    /// Timestamp in ISO8601.
    pub timestamp: DateTime<Utc>,
    /// Module emitting the log.
    pub module: String,
    /// Severity.
    pub level: LogLevel,
    /// Human-readable message.
    pub message: String,
    /// Identifier of the request the record belongs to, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Arbitrary JSON payload for metrics/fields.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl LogRecord {
    /// Creates a record with the provided info.
    #[must_use]
    pub fn new(module: impl Into<String>, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            module: module.into(),
            level,
            message: message.into(),
            request_id: None,
            metadata: serde_json::Map::new(),
        }
    }

    /// Tags the record with a request identifier.
    #[must_use]
    pub fn with_request(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Copies the fields of a JSON object into the metadata map. Non-object values are ignored.
    #[must_use]
    pub fn with_metadata(mut self, metadata: &serde_json::Value) -> Self {
        if let Some(obj) = metadata.as_object() {
            self.metadata.extend(obj.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        self
    }
}

enum LogSink {
    File { path: PathBuf, writer: Mutex<File> },
    Stderr(Mutex<io::Stderr>),
}

/// Thread-safe JSON-lines logger writing to an append-only file or to stderr.
pub struct JsonLogger {
    sink: LogSink,
    min_level: LogLevel,
}

impl std::fmt::Debug for JsonLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLogger")
            .field("path", &self.path())
            .field("min_level", &self.min_level)
            .finish()
    }
}

impl JsonLogger {
    /// Creates or opens a file logger at the desired path.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        Ok(Self {
            sink: LogSink::File {
                path,
                writer: Mutex::new(file),
            },
            min_level: LogLevel::Debug,
        })
    }

    /// Creates a logger writing JSON lines to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            sink: LogSink::Stderr(Mutex::new(io::stderr())),
            min_level: LogLevel::Debug,
        }
    }

    /// Drops records below `level`.
    #[must_use]
    pub const fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Returns whether a record at `level` would be written.
    #[must_use]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    /// Writes a log record as a JSON line.
    pub fn log(&self, record: &LogRecord) -> Result<()> {
        if !self.enabled(record.level) {
            return Ok(());
        }
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        match &self.sink {
            LogSink::File { writer, .. } => {
                let mut writer = writer.lock();
                writer.write_all(&line)?;
                writer.flush()?;
            }
            LogSink::Stderr(stderr) => {
                let mut stderr = stderr.lock();
                stderr.write_all(&line)?;
            }
        }
        Ok(())
    }

    /// Returns the underlying file path, `None` for the stderr sink.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match &self.sink {
            LogSink::File { path, .. } => Some(path),
            LogSink::Stderr(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn writes_json_lines() {
        let dir = tempdir().unwrap();
        let logger = JsonLogger::new(dir.path().join("test.log")).unwrap();
        logger
            .log(&LogRecord::new("module", LogLevel::Info, "hello"))
            .unwrap();
        let content = fs::read_to_string(logger.path().unwrap()).unwrap();
        assert!(content.contains("\"message\":\"hello\""));
        assert!(!content.contains("request_id"));
    }

    #[test]
    fn drops_records_below_min_level() {
        let dir = tempdir().unwrap();
        let logger = JsonLogger::new(dir.path().join("filtered.log"))
            .unwrap()
            .with_min_level(LogLevel::Warn);
        logger
            .log(&LogRecord::new("verdict", LogLevel::Info, "quiet"))
            .unwrap();
        logger
            .log(&LogRecord::new("verdict", LogLevel::Error, "loud"))
            .unwrap();
        let content = fs::read_to_string(logger.path().unwrap()).unwrap();
        assert!(!content.contains("quiet"));
        assert!(content.contains("loud"));
    }

    #[test]
    fn request_id_and_metadata_are_serialized() {
        let record = LogRecord::new("verdict", LogLevel::Info, "stage")
            .with_request("analysis_1")
            .with_metadata(&json!({ "hits": 3 }));
        let line = serde_json::to_string(&record).unwrap();
        assert!(line.contains("\"request_id\":\"analysis_1\""));
        assert!(line.contains("\"hits\":3"));
    }

    #[test]
    fn parses_level_names() {
        assert_eq!(LogLevel::parse("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse(" debug "), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("loud"), None);
    }
}
