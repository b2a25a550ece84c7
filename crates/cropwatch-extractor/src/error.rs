//! Error types for the Extractor
//!
//! Extraction itself never fails: bad model output degrades to a fallback.
//! These errors cover caller mistakes and configuration problems.

use thiserror::Error;

/// Errors that can occur around extraction and analysis
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// The request does not carry the inputs its kind needs
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
