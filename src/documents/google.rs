//! Google Docs / Google Sheets reader over the read-only REST APIs.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use super::{DocumentKind, DocumentRef, DocumentSource};
use crate::error::DocumentError;

const DOCS_API: &str = "https://docs.googleapis.com";
const SHEETS_API: &str = "https://sheets.googleapis.com";

/// Reads documents with a read-only OAuth bearer token.
pub struct GoogleDocumentSource {
    client: reqwest::Client,
    token: SecretString,
    docs_base: String,
    sheets_base: String,
}

impl GoogleDocumentSource {
    pub fn new(client: reqwest::Client, token: SecretString) -> Self {
        Self {
            client,
            token,
            docs_base: DOCS_API.to_string(),
            sheets_base: SHEETS_API.to_string(),
        }
    }

    /// Point both APIs at another host.
    pub fn with_base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/').to_string();
        self.docs_base = base.clone();
        self.sheets_base = base;
        self
    }

    async fn get_json(&self, doc: &DocumentRef, endpoint: String) -> Result<Value, DocumentError> {
        let response = self
            .client
            .get(&endpoint)
            .bearer_auth(self.token.expose_secret())
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DocumentError::NotFound {
                url: doc.url.clone(),
            });
        }
        if !status.is_success() {
            return Err(DocumentError::Status {
                url: doc.url.clone(),
                status: status.as_u16(),
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl DocumentSource for GoogleDocumentSource {
    fn name(&self) -> &str {
        "google"
    }

    async fn read(&self, doc: &DocumentRef) -> Result<String, DocumentError> {
        let id = match (&doc.kind, &doc.id) {
            (DocumentKind::Doc | DocumentKind::Sheet, Some(id)) => id,
            _ => {
                return Err(DocumentError::UnsupportedKind {
                    url: doc.url.clone(),
                });
            }
        };

        let text = match doc.kind {
            DocumentKind::Doc => {
                let json = self
                    .get_json(doc, format!("{}/v1/documents/{id}", self.docs_base))
                    .await?;
                flatten_doc(&json)
            }
            _ => {
                let json = self
                    .get_json(
                        doc,
                        format!(
                            "{}/v4/spreadsheets/{id}?includeGridData=true",
                            self.sheets_base
                        ),
                    )
                    .await?;
                flatten_sheet(&json)
            }
        };

        if text.trim().is_empty() {
            return Err(DocumentError::Empty {
                url: doc.url.clone(),
            });
        }
        tracing::debug!(url = %doc.url, chars = text.len(), "Read Google document");
        Ok(text)
    }
}

/// Concatenate every text run of a Docs API document, tables included.
pub fn flatten_doc(json: &Value) -> String {
    let mut out = String::new();
    if let Some(title) = json.get("title").and_then(Value::as_str) {
        out.push_str(&format!("# {title}\n\n"));
    }
    if let Some(content) = json.pointer("/body/content").and_then(Value::as_array) {
        collect_structural(content, &mut out);
    }
    out
}

fn collect_structural(elements: &[Value], out: &mut String) {
    for element in elements {
        if let Some(runs) = element
            .pointer("/paragraph/elements")
            .and_then(Value::as_array)
        {
            for run in runs {
                if let Some(text) = run.pointer("/textRun/content").and_then(Value::as_str) {
                    out.push_str(text);
                }
            }
        }
        if let Some(rows) = element.pointer("/table/tableRows").and_then(Value::as_array) {
            for row in rows {
                let cells = row
                    .get("tableCells")
                    .and_then(Value::as_array)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                let texts: Vec<String> = cells
                    .iter()
                    .map(|cell| {
                        let mut cell_text = String::new();
                        if let Some(content) = cell.get("content").and_then(Value::as_array) {
                            collect_structural(content, &mut cell_text);
                        }
                        cell_text.trim().to_string()
                    })
                    .collect();
                out.push_str(&texts.join(" | "));
                out.push('\n');
            }
        }
    }
}

/// Render every sheet as `## title` followed by ` | `-separated rows.
pub fn flatten_sheet(json: &Value) -> String {
    let mut out = String::new();
    let sheets = json
        .get("sheets")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for sheet in sheets {
        if let Some(title) = sheet.pointer("/properties/title").and_then(Value::as_str) {
            out.push_str(&format!("## {title}\n"));
        }
        let grids = sheet
            .get("data")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        for grid in grids {
            let rows = grid
                .get("rowData")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            for row in rows {
                let cells: Vec<&str> = row
                    .get("values")
                    .and_then(Value::as_array)
                    .map(|values| {
                        values
                            .iter()
                            .map(|v| v.get("formattedValue").and_then(Value::as_str).unwrap_or(""))
                            .collect()
                    })
                    .unwrap_or_default();
                if cells.iter().all(|c| c.is_empty()) {
                    continue;
                }
                out.push_str(&cells.join(" | "));
                out.push('\n');
            }
        }
        out.push('\n');
    }
    out
}
