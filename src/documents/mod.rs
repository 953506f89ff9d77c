//! External documents the assistant can read.
//!
//! A document URL is classified by its path shape, read through a
//! `DocumentSource`, and returned as plain text. `fetch_document_text` never
//! fails: any problem comes back as a sentence the assistant can relay.

pub mod google;
pub mod sample;

pub use google::GoogleDocumentSource;
pub use sample::SampleDocumentSource;

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use crate::error::DocumentError;

static DOC_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(document|spreadsheets)/d/([A-Za-z0-9_-]+)").expect("static document path regex")
});

/// Kind of document, derived from the URL path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// `/document/d/<id>`
    Doc,
    /// `/spreadsheets/d/<id>`
    Sheet,
    Unknown,
}

/// A parsed document URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    pub url: String,
    pub kind: DocumentKind,
    pub id: Option<String>,
}

impl DocumentRef {
    /// Parse an absolute http(s) URL and classify it.
    pub fn parse(raw: &str) -> Result<Self, DocumentError> {
        let url = reqwest::Url::parse(raw.trim()).map_err(|e| DocumentError::InvalidUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DocumentError::InvalidUrl {
                url: raw.to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        let (kind, id) = match DOC_PATH_RE.captures(url.path()) {
            Some(caps) => {
                let kind = match &caps[1] {
                    "document" => DocumentKind::Doc,
                    _ => DocumentKind::Sheet,
                };
                (kind, Some(caps[2].to_string()))
            }
            None => (DocumentKind::Unknown, None),
        };

        Ok(Self {
            url: url.to_string(),
            kind,
            id,
        })
    }
}

/// Read-only access to external documents.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    fn name(&self) -> &str;

    /// Read a document and flatten it to plain text.
    async fn read(&self, doc: &DocumentRef) -> Result<String, DocumentError>;
}

/// Read `raw_url` through `source`, turning every failure into a message.
pub async fn fetch_document_text(source: &dyn DocumentSource, raw_url: &str) -> String {
    tracing::info!(url = %raw_url, source = source.name(), "Fetching document content");

    let doc = match DocumentRef::parse(raw_url) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!(url = %raw_url, error = %e, "Rejected document URL");
            return format!(
                "La URL \"{raw_url}\" no es válida. Pide al usuario que verifique la URL."
            );
        }
    };

    match source.read(&doc).await {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) | Err(DocumentError::NotFound { .. }) | Err(DocumentError::Empty { .. }) => {
            "No se pudo encontrar información en el documento especificado. Pide al usuario que verifique la URL.".to_string()
        }
        Err(DocumentError::UnsupportedKind { .. }) => {
            "El tipo de documento de esa URL no es compatible; solo se pueden leer Google Docs y Google Sheets.".to_string()
        }
        Err(e) => {
            tracing::warn!(url = %raw_url, error = %e, "Document fetch failed");
            format!(
                "No se pudo leer el documento ({e}). Informa al usuario que el documento no está disponible en este momento."
            )
        }
    }
}
