#![deny(missing_docs)]

//! Core library for the DocuChat summarization and document-chat server.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Upload validation and text extraction.
pub mod extract;
/// Completion provider abstraction and the OpenRouter adapter.
pub mod gateway;
/// Structured logging and tracing setup.
pub mod logging;
/// Usage metrics helpers.
pub mod metrics;
/// Summarization and session chat pipeline.
pub mod pipeline;
