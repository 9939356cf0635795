//! Error types for the rcpt-core library.
//!
//! Receipt interpretation itself never fails: malformed OCR text resolves to
//! documented defaults. These errors cover building a parser from
//! configuration and decoding remote-service payloads.

use thiserror::Error;

/// Main error type for the rcpt library.
#[derive(Error, Debug)]
pub enum RcptError {
    /// Dictionary loading error.
    #[error("dictionary error: {0}")]
    Dictionary(#[from] DictionaryError),

    /// Remote response decoding error.
    #[error("remote response error: {0}")]
    Remote(#[from] RemoteError),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to loading a vocabulary.
#[derive(Error, Debug)]
pub enum DictionaryError {
    /// A dictionary line could not be parsed.
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// The dictionary source contained no entries.
    #[error("dictionary has no entries")]
    Empty,
}

/// Errors related to structured payloads from a remote correction service.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// The response text contains no `{...}` object.
    #[error("no JSON object found in response")]
    NoJsonObject,

    /// The embedded object is not valid receipt JSON.
    #[error("invalid receipt JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for the rcpt library.
pub type Result<T> = std::result::Result<T, RcptError>;
