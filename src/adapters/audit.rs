use crate::config::{AuditConfig, AuditSinkKind};
use crate::domain::model::AuditEntry;
use crate::domain::ports::AuditSink;
use crate::utils::error::{GatewayError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

/// Target of audit events; sits under the crate so the default filters keep it.
pub const AUDIT_TARGET: &str = "garden_gate::audit";

/// Emits each rejection as a structured event on [`AUDIT_TARGET`].
#[derive(Debug, Clone, Default)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, entry: &AuditEntry) -> Result<()> {
        tracing::info!(
            target: AUDIT_TARGET,
            timestamp = %entry.timestamp,
            operation = %entry.operation,
            query = %entry.query,
            query_length = entry.query_length,
            "Off-topic query rejected"
        );
        Ok(())
    }
}

/// Appends one JSON object per line.
#[derive(Debug, Clone)]
pub struct JsonlAuditSink {
    path: PathBuf,
}

impl JsonlAuditSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl AuditSink for JsonlAuditSink {
    async fn record(&self, entry: &AuditEntry) -> Result<()> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        // 單次寫入整行，併發時不保證順序
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }
}

pub fn build_audit_sink(config: &AuditConfig) -> Result<Arc<dyn AuditSink>> {
    match config.sink {
        AuditSinkKind::Log => Ok(Arc::new(TracingAuditSink)),
        AuditSinkKind::File => {
            let path = config.path.as_ref().ok_or_else(|| GatewayError::AuditError {
                message: "file sink selected but audit.path is not set".to_string(),
            })?;
            tracing::info!("Recording rejected queries to {}", path);
            Ok(Arc::new(JsonlAuditSink::new(path)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Operation;
    use crate::utils::logger::{LAMBDA_DIRECTIVES, SERVER_DIRECTIVES};
    use std::sync::Mutex;
    use tempfile::TempDir;
    use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    // 以指定的預設 filter 收集 JSON 日誌輸出
    fn record_with_filter(directives: &str, entry: &AuditEntry) -> String {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::new(directives))
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(move || writer.clone()),
            );

        tracing::subscriber::with_default(subscriber, || {
            tokio_test::block_on(TracingAuditSink.record(entry)).unwrap();
        });

        let bytes = logs.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[tokio::test]
    async fn test_jsonl_sink_appends_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("rejections.jsonl");
        let sink = JsonlAuditSink::new(&path);

        sink.record(&AuditEntry::new(Operation::Consult, "help"))
            .await
            .unwrap();
        sink.record(&AuditEntry::new(Operation::Diagnose, "write a poem"))
            .await
            .unwrap();

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let second: AuditEntry = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.operation, Operation::Diagnose);
        assert_eq!(second.query, "write a poem");
        assert_eq!(second.query_length, 12);
    }

    #[tokio::test]
    async fn test_jsonl_sink_reports_unwritable_path() {
        let temp_dir = TempDir::new().unwrap();
        // 目錄本身不能當作檔案開啟
        let sink = JsonlAuditSink::new(temp_dir.path());
        let result = sink
            .record(&AuditEntry::new(Operation::Plan, "stock tips"))
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_tracing_sink_never_fails() {
        let sink = TracingAuditSink;
        let result =
            tokio_test::block_on(sink.record(&AuditEntry::new(Operation::GridPlan, "tax")));
        assert!(result.is_ok());
    }

    #[test]
    fn test_tracing_sink_survives_default_filters() {
        let entry = AuditEntry::new(Operation::Consult, "write my essay");
        for directives in [LAMBDA_DIRECTIVES, SERVER_DIRECTIVES] {
            let output = record_with_filter(directives, &entry);
            assert!(output.contains("Off-topic query rejected"), "{directives}");
            assert!(output.contains("write my essay"), "{directives}");
            assert!(output.contains(AUDIT_TARGET), "{directives}");
        }
    }

    #[test]
    fn test_build_audit_sink_requires_path_for_file() {
        let config = AuditConfig {
            sink: AuditSinkKind::File,
            path: None,
        };
        assert!(build_audit_sink(&config).is_err());
        assert!(build_audit_sink(&AuditConfig::default()).is_ok());
    }
}
