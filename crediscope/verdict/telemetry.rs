use std::{fmt, path::PathBuf, sync::Arc};

use anyhow::Result;
use serde_json::Value;
use shared_event_bus::{EventPublisher, EventRecord};
use shared_logging::{JsonLogger, LogLevel, LogRecord};
use uuid::Uuid;

/// Builder for verdict telemetry sinks.
pub struct VerdictTelemetryBuilder {
    module: String,
    log_path: Option<PathBuf>,
    stderr: bool,
    min_level: LogLevel,
    event_publisher: Option<Arc<dyn EventPublisher>>,
}

impl VerdictTelemetryBuilder {
    /// Creates the builder.
    #[must_use]
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            log_path: None,
            stderr: false,
            min_level: LogLevel::Debug,
            event_publisher: None,
        }
    }

    /// Sets the log path. Takes precedence over [`Self::stderr`].
    #[must_use]
    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    /// Writes log records to stderr when no log path is set.
    #[must_use]
    pub const fn stderr(mut self) -> Self {
        self.stderr = true;
        self
    }

    /// Drops log records below `level`.
    #[must_use]
    pub const fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Sets the event publisher.
    #[must_use]
    pub fn event_publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.event_publisher = Some(publisher);
        self
    }

    /// Builds the telemetry handle.
    pub fn build(self) -> Result<VerdictTelemetry> {
        let logger = match (self.log_path, self.stderr) {
            (Some(path), _) => Some(JsonLogger::new(path)?),
            (None, true) => Some(JsonLogger::stderr()),
            (None, false) => None,
        }
        .map(|logger| logger.with_min_level(self.min_level));
        Ok(VerdictTelemetry {
            inner: Arc::new(TelemetryInner {
                module: self.module,
                logger,
                publisher: self.event_publisher,
            }),
        })
    }
}

/// Telemetry handle shared across verdict components.
#[derive(Clone)]
pub struct VerdictTelemetry {
    inner: Arc<TelemetryInner>,
}

impl fmt::Debug for VerdictTelemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerdictTelemetry")
            .field("module", &self.inner.module)
            .field("logger", &self.inner.logger.is_some())
            .field("events", &self.inner.publisher.is_some())
            .finish()
    }
}

struct TelemetryInner {
    module: String,
    logger: Option<JsonLogger>,
    publisher: Option<Arc<dyn EventPublisher>>,
}

impl VerdictTelemetry {
    /// Returns a builder.
    #[must_use]
    pub fn builder(module: impl Into<String>) -> VerdictTelemetryBuilder {
        VerdictTelemetryBuilder::new(module)
    }

    /// Module name stamped on records.
    #[must_use]
    pub fn module(&self) -> &str {
        &self.inner.module
    }

    /// Logs structured metadata.
    pub fn log(&self, level: LogLevel, message: &str, metadata: Value) -> Result<()> {
        self.write(LogRecord::new(&self.inner.module, level, message).with_metadata(&metadata))
    }

    /// Logs structured metadata tagged with a request id.
    pub fn log_request(
        &self,
        level: LogLevel,
        message: &str,
        request_id: &str,
        metadata: Value,
    ) -> Result<()> {
        self.write(
            LogRecord::new(&self.inner.module, level, message)
                .with_request(request_id)
                .with_metadata(&metadata),
        )
    }

    fn write(&self, record: LogRecord) -> Result<()> {
        if let Some(logger) = &self.inner.logger {
            logger.log(&record)?;
        }
        Ok(())
    }

    fn record(&self, event_type: &str, correlation_id: Option<&str>, payload: Value) -> EventRecord {
        EventRecord {
            id: format!("evt-{}", Uuid::new_v4()),
            source: self.inner.module.clone(),
            event_type: event_type.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            correlation_id: correlation_id.map(str::to_string),
            payload,
        }
    }

    /// Publishes an event and waits for the publisher.
    pub async fn emit(
        &self,
        event_type: &str,
        correlation_id: Option<&str>,
        payload: Value,
    ) -> Result<()> {
        if let Some(publisher) = &self.inner.publisher {
            publisher
                .publish(self.record(event_type, correlation_id, payload))
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared_event_bus::MemoryEventBus;
    use tempfile::tempdir;

    #[tokio::test]
    async fn telemetry_writes_log_and_event() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("verdict.log");
        let bus = Arc::new(MemoryEventBus::new(16));
        let telemetry = VerdictTelemetry::builder("verdict")
            .log_path(&path)
            .event_publisher(bus.clone())
            .build()
            .unwrap();
        telemetry
            .log(LogLevel::Info, "verdict.start", json!({ "hits": 3 }))
            .unwrap();
        telemetry
            .emit("verdict.package.assembled", None, json!({ "label": "FALSE" }))
            .await
            .unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("verdict.start"));
        assert_eq!(bus.snapshot().len(), 1);
    }

    #[test]
    fn min_level_filters_records() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("filtered.log");
        let telemetry = VerdictTelemetry::builder("verdict")
            .log_path(&path)
            .min_level(LogLevel::Warn)
            .build()
            .unwrap();
        telemetry
            .log(LogLevel::Info, "dropped", json!({}))
            .unwrap();
        telemetry
            .log_request(LogLevel::Error, "kept", "req-1", json!({ "stage": "fetch" }))
            .unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("dropped"));
        assert!(content.contains("\"request_id\":\"req-1\""));
    }

    #[tokio::test]
    async fn emit_carries_correlation_id() {
        let bus = Arc::new(MemoryEventBus::new(4));
        let telemetry = VerdictTelemetry::builder("verdict")
            .event_publisher(bus.clone())
            .build()
            .unwrap();
        telemetry
            .emit("verdict.signals.fetched", Some("run-7"), json!({ "hits": 0 }))
            .await
            .unwrap();
        let events = bus.events_of_type("verdict.signals.fetched");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].correlation_id.as_deref(), Some("run-7"));
        assert_eq!(events[0].source, "verdict");
    }

    #[tokio::test]
    async fn without_sinks_everything_is_a_no_op() {
        let telemetry = VerdictTelemetry::builder("verdict").build().unwrap();
        assert!(telemetry.log(LogLevel::Error, "x", json!({})).is_ok());
        assert!(telemetry.emit("x", None, json!({})).await.is_ok());
    }

    #[test]
    fn stderr_sink_accepts_records() {
        let telemetry = VerdictTelemetry::builder("verdict")
            .stderr()
            .min_level(LogLevel::Error)
            .build()
            .unwrap();
        assert!(telemetry.log(LogLevel::Info, "filtered", json!({})).is_ok());
        assert!(telemetry
            .log_request(LogLevel::Error, "kept", "req-2", json!({}))
            .is_ok());
    }
}
