//! Error types for Engrave operations.
//!
//! This module provides the main error type [`EngraveError`] which wraps the
//! error conditions that can occur while reading a score document and
//! laying it out. The layout passes themselves never fail.

use std::io;

use thiserror::Error;

/// The main error type for Engrave operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the source text next to the TOML error so the
/// span it reports can be rendered against it.
#[derive(Debug, Error)]
pub enum EngraveError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: toml::de::Error, src: String },

    #[error("Layout error: {0}")]
    Layout(String),
}

impl EngraveError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: toml::de::Error, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
