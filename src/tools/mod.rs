//! Tools the assistant model can call.

pub mod document;
pub mod registry;
pub mod tool;

pub use document::FetchDocumentTool;
pub use registry::ToolRegistry;
pub use tool::*;
