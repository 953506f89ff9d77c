//! Service configuration, read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::assistant::SpeechConfig;
use crate::catalog::Catalog;
use crate::configurator::DEFAULT_SESSION_TTL;
use crate::documents::SampleDocumentSource;
use crate::error::{CatalogError, ConfigError};
use crate::orders::OrderConfig;

/// Where the assistant gets its product knowledge from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssistantModeKind {
    /// Catalog injected into the prompt.
    #[default]
    Context,
    /// Documents read through the `fetchDocumentContent` tool.
    Tools,
}

impl std::str::FromStr for AssistantModeKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "context" | "" => Ok(Self::Context),
            "tools" => Ok(Self::Tools),
            other => Err(ConfigError::InvalidValue {
                key: "CONFIGURATOR_ASSISTANT_MODE".to_string(),
                message: format!("expected 'context' or 'tools', got '{other}'"),
            }),
        }
    }
}

/// Top-level service configuration. The LLM backend is configured
/// separately through `LlmConfig`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: String,
    pub port: u16,
    /// JSON catalog to load instead of the built-in one.
    pub catalog_path: Option<PathBuf>,
    pub assistant_mode: AssistantModeKind,
    /// Documents advertised to the model in tools mode.
    pub document_urls: Vec<String>,
    /// Enables the Google Docs/Sheets document source.
    pub google_docs_token: Option<SecretString>,
    /// Timeout for outbound HTTP (webhook, documents, speech).
    pub http_timeout: Duration,
    /// Idle time after which a wizard session is dropped.
    pub session_ttl: Duration,
    pub orders: OrderConfig,
    pub speech: SpeechConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8080,
            catalog_path: None,
            assistant_mode: AssistantModeKind::Context,
            document_urls: SampleDocumentSource::known_urls(),
            google_docs_token: None,
            http_timeout: Duration::from_secs(10),
            session_ttl: DEFAULT_SESSION_TTL,
            orders: OrderConfig::default(),
            speech: SpeechConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port: u16 = std::env::var("CONFIGURATOR_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .unwrap_or(defaults.port);

        let bind = std::env::var("CONFIGURATOR_BIND").unwrap_or(defaults.bind);

        let catalog_path = std::env::var("CONFIGURATOR_CATALOG_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let assistant_mode = match std::env::var("CONFIGURATOR_ASSISTANT_MODE") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.assistant_mode,
        };

        let document_urls = std::env::var("CONFIGURATOR_DOCUMENT_URLS")
            .map(|raw| parse_url_list(&raw))
            .ok()
            .filter(|urls| !urls.is_empty())
            .unwrap_or(defaults.document_urls);

        let google_docs_token = std::env::var("GOOGLE_DOCS_TOKEN")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(SecretString::from);

        let session_ttl = std::env::var("CONFIGURATOR_SESSION_TTL_SECS")
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.session_ttl);

        let orders = OrderConfig::from_env();

        Ok(Self {
            bind,
            port,
            catalog_path,
            assistant_mode,
            document_urls,
            google_docs_token,
            http_timeout: orders.http_timeout,
            session_ttl,
            orders,
            speech: SpeechConfig::from_env(),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    /// The configured catalog file, or the built-in catalog.
    pub fn load_catalog(&self) -> Result<Catalog, CatalogError> {
        match &self.catalog_path {
            Some(path) => Catalog::from_json_file(path),
            None => Ok(Catalog::builtin()),
        }
    }
}

/// Split a comma-separated URL list, dropping blanks.
pub fn parse_url_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
