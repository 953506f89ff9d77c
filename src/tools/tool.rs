//! The `Tool` trait and its output type.

use std::time::Duration;

use async_trait::async_trait;

pub use crate::error::ToolError;

/// Output of a successful tool execution.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub content: String,
    pub duration: Duration,
}

impl ToolOutput {
    pub fn text(content: impl Into<String>, duration: Duration) -> Self {
        Self {
            content: content.into(),
            duration,
        }
    }
}

/// A capability the assistant model can call.
#[async_trait]
pub trait Tool: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the parameters object.
    fn parameters_schema(&self) -> serde_json::Value;

    async fn execute(&self, params: serde_json::Value) -> Result<ToolOutput, ToolError>;
}

/// Pull a required string parameter out of a tool's arguments.
pub fn require_str<'a>(
    tool: &str,
    params: &'a serde_json::Value,
    key: &str,
) -> Result<&'a str, ToolError> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::InvalidParameters {
            name: tool.to_string(),
            reason: format!("missing '{key}' parameter"),
        })
}
