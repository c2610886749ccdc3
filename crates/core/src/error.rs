//! Error types for encyclodiff operations.
//!
//! This module defines the main error type [`EncyclodiffError`] which represents
//! everything that can go wrong around the comparison engine: fetching pages,
//! reading local files, loading sampling configuration and writing reports.
//! The comparison engine itself never returns an error.
//!
//! # Example
//!
//! ```rust
//! use encyclodiff_core::{EncyclodiffError, Result};
//!
//! fn require_html(html: &str) -> Result<&str> {
//!     if html.trim().is_empty() {
//!         return Err(EncyclodiffError::HtmlParseError("empty document".to_string()));
//!     }
//!     Ok(html)
//! }
//! # assert!(require_html("").is_err());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for fetch, parse, sampling and reporting operations.
#[derive(Error, Debug)]
pub enum EncyclodiffError {
    /// HTTP request errors from reqwest.
    ///
    /// This variant wraps network errors, DNS failures, connection issues,
    /// and other HTTP-related problems.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// The server answered with a non-success status that is not worth retrying.
    #[error("HTTP {status} while fetching {url}")]
    HttpStatus { status: u16, url: String },

    /// Every retry attempt failed.
    ///
    /// Callers orchestrating a batch treat this as "skip the topic".
    #[error("Failed to fetch {url} after {attempts} attempts")]
    RetriesExhausted { url: String, attempts: u32 },

    /// Invalid URL provided or produced by a page source.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTML parsing errors, usually an invalid CSS selector.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File read/write errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Sampling configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// JSON (de)serialization errors for results and configuration.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for EncyclodiffError.
pub type Result<T> = std::result::Result<T, EncyclodiffError>;
