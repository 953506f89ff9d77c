//! Error types for the configurator.

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Catalog construction and loading errors.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Select product {product_id} has no options")]
    EmptyOptions { product_id: String },

    #[error("Product id {product_id} appears more than once")]
    DuplicateProduct { product_id: String },

    #[error("Plan id {plan_id} appears more than once")]
    DuplicatePlan { plan_id: String },

    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from mutating a product selection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("Product {product_id} not found in catalog")]
    UnknownProduct { product_id: String },

    #[error("Option {option_id} not found for product {product_id}")]
    UnknownOption {
        product_id: String,
        option_id: String,
    },

    #[error("Product {product_id} is a {actual} product, expected {expected}")]
    WrongKind {
        product_id: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Plan {plan_id} not found")]
    UnknownPlan { plan_id: String },
}

/// A single failed field from customer validation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// Wizard transition errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WizardError {
    #[error("Cannot {action} while on step {step}")]
    InvalidTransition { step: String, action: String },

    #[error("Customer information is required before step {target}")]
    MissingCustomer { target: String },

    #[error("Customer information is invalid ({} field errors)", .0.len())]
    InvalidCustomer(Vec<FieldError>),

    #[error("Cannot continue with an empty selection")]
    EmptySelection,

    #[error(transparent)]
    Selection(#[from] SelectionError),
}

/// Order pipeline errors.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Payment declined: {0}")]
    PaymentDeclined(String),

    #[error("Webhook {url} returned status {status}")]
    WebhookStatus { url: String, status: u16 },

    #[error("Webhook request failed: {0}")]
    WebhookRequest(#[from] reqwest::Error),
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Speech-to-text and text-to-speech errors.
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("Invalid audio data URI: {0}")]
    InvalidDataUri(String),

    #[error("Audio transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("Speech synthesis failed: {0}")]
    SynthesisFailed(String),

    #[error("WAV encoding failed: {0}")]
    Encoding(#[from] hound::Error),
}

/// Document source errors.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Invalid document URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unsupported document kind for {url}")]
    UnsupportedKind { url: String },

    #[error("Document not found: {url}")]
    NotFound { url: String },

    #[error("Document source returned status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Document {url} has no readable text")]
    Empty { url: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Tool execution errors.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Tool {name} not found")]
    NotFound { name: String },

    #[error("Invalid parameters for tool {name}: {reason}")]
    InvalidParameters { name: String, reason: String },
}

/// Assistant flow errors.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("Conversation history is empty")]
    EmptyHistory,

    #[error("The last message must come from the user")]
    LastMessageNotFromUser,

    #[error("Tool loop exceeded {max} rounds without a final answer")]
    ToolLoopExhausted { max: usize },

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Speech(#[from] SpeechError),
}
