use crate::domain::model::AuditEntry;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Text returned by the upstream model, with its usage block passed through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub text: String,
    pub usage: Option<serde_json::Value>,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<Generation>;
}

/// Append-only record of rejected queries.
///
/// Callers never let an `Err` from `record` escape the request path.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, entry: &AuditEntry) -> Result<()>;
}
