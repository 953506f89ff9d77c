//! Document reading tool.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::documents::{DocumentSource, fetch_document_text};
use crate::tools::tool::{Tool, ToolError, ToolOutput, require_str};

/// Reads a Google Doc or Sheet and hands its text back to the model.
///
/// Read failures are not tool errors: the model receives a message it can
/// relay to the user instead.
#[derive(Clone)]
pub struct FetchDocumentTool {
    source: Arc<dyn DocumentSource>,
}

impl FetchDocumentTool {
    pub fn new(source: Arc<dyn DocumentSource>) -> Self {
        Self { source }
    }
}

impl std::fmt::Debug for FetchDocumentTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchDocumentTool")
            .field("source", &self.source.name())
            .finish()
    }
}

#[async_trait]
impl Tool for FetchDocumentTool {
    fn name(&self) -> &str {
        "fetchDocumentContent"
    }

    fn description(&self) -> &str {
        "Busca y devuelve el contenido de un documento específico a partir de su URL. \
         Útil para obtener información detallada sobre productos, planes o políticas \
         de la empresa."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "La URL completa del Google Doc o Google Sheet a leer."
                }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let url = require_str(self.name(), &params, "url")?;
        if url.trim().is_empty() {
            return Err(ToolError::InvalidParameters {
                name: self.name().to_string(),
                reason: "url cannot be empty".to_string(),
            });
        }

        let content = fetch_document_text(self.source.as_ref(), url).await;
        Ok(ToolOutput::text(content, start.elapsed()))
    }
}
