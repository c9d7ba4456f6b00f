#![deny(missing_docs)]

//! Core library for Docsum: turn an uploaded document into a structured summary.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Media-type routing and text extraction strategies.
pub mod extraction;
/// Structured logging and tracing setup.
pub mod logging;
/// Run counters.
pub mod metrics;
/// Emptiness detection and prompt-size bounding.
pub mod normalize;
/// Run orchestration and lifecycle.
pub mod pipeline;
/// Prompt construction, the remote model client, and reply decoding.
pub mod summarization;
