//! Plan Configurator: guided product/plan configurator with an AI assistant.

pub mod assistant;
pub mod catalog;
pub mod config;
pub mod configurator;
pub mod documents;
pub mod error;
pub mod llm;
pub mod orders;
pub mod server;
pub mod tools;
