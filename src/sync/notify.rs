// Run summary notifications.
// Fire-and-forget delivery of a titled list of name/value fields.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;

/// One line of a summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationField {
    pub name: String,
    pub value: String,
}

impl NotificationField {
    /// Create a field from any displayable value.
    pub fn new(name: impl Into<String>, value: impl ToString) -> Self {
        Self {
            name: name.into(),
            value: value.to_string(),
        }
    }
}

/// Destination for run summaries. Failures are logged by the caller, never fatal.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, title: &str, fields: &[NotificationField]) -> Result<()>;
}

/// Sink that writes summaries to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn notify(&self, title: &str, fields: &[NotificationField]) -> Result<()> {
        let body = fields
            .iter()
            .map(|f| format!("{}: {}", f.name, f.value))
            .collect::<Vec<_>>()
            .join(", ");
        info!(title, summary = %body, "sync notification");
        Ok(())
    }
}
