#![deny(missing_docs)]

//! Core library for Plainly, a plain-language summarizer and Q&A service for legal documents.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Text extraction from uploaded documents with OCR fallback.
pub mod extraction;
/// Text-generation client abstraction and provider adapters.
pub mod generation;
/// Structured logging and tracing setup.
pub mod logging;
/// Pipeline activity counters.
pub mod metrics;
/// Document processing pipeline utilities.
pub mod processing;
/// In-memory document context store.
pub mod store;
