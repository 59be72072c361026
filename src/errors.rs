//! # Error Handling Module
//!
//! ## Purpose
//! Centralized error handling for the corpus normalization pipeline, providing
//! structured error types for configuration, input, and transformation failures.
//!
//! ## Input/Output Specification
//! - **Input**: Error conditions from configuration loading, corpus I/O, rule
//!   compilation, and network fetching
//! - **Output**: Structured error types with context, suitable for logging and
//!   process exit-code mapping
//! - **Error Categories**: configuration, input, ingestion, corpus, io
//!
//! ## Key Features
//! - Hierarchical error types with detailed context
//! - Automatic conversion from common library errors
//! - Fatal/non-fatal distinction: config and input errors abort a run before
//!   any output is written; per-verse anomalies are diagnostics, not errors
//!   (see `pipeline::RunOutcome`)

use std::path::PathBuf;
use thiserror::Error;

/// Result type used throughout the application
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Error types for the corpus normalization pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration file failed to parse or violates its schema
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A rule pattern is not a valid regular expression.
    /// Rule compilation is atomic: one bad pattern aborts the whole rule set.
    #[error("Invalid rule pattern '{pattern}': {details}")]
    Pattern { pattern: String, details: String },

    /// Source file or resource absent; processing for that input halts
    #[error("Input not found: {path}")]
    InputNotFound { path: PathBuf },

    /// Network fetch failed after a bounded wait. The caller must treat this
    /// as "no input available", never as a partially populated corpus.
    #[error("Fetch failed for {url}: {details}")]
    Fetch { url: String, details: String },

    /// Source document could not be parsed into the canonical corpus shape
    #[error("Failed to parse {format} source: {details}")]
    SourceParse { format: String, details: String },

    /// Corpus JSON violates the book/chapter/verse key grammar
    #[error("Malformed corpus: {details}")]
    MalformedCorpus { details: String },

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    /// Get error category for metrics and logging
    pub fn category(&self) -> &'static str {
        match self {
            PipelineError::Config { .. } | PipelineError::Pattern { .. } => "configuration",
            PipelineError::InputNotFound { .. } | PipelineError::Fetch { .. } => "input",
            PipelineError::SourceParse { .. } => "ingestion",
            PipelineError::MalformedCorpus { .. } => "corpus",
            PipelineError::Io(_) | PipelineError::Json(_) => "io",
        }
    }

    /// Exit status for the command surface: missing/invalid input and
    /// configuration problems exit with 2.
    pub fn exit_code(&self) -> u8 {
        2
    }
}

/// Build a `Config` error from a format string
#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::errors::PipelineError::Config {
            message: $msg.to_string(),
        }
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::errors::PipelineError::Config {
            message: format!($fmt, $($arg)*),
        }
    };
}
