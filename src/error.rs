//! # Error Types
//!
//! This module defines all error types for the seq9 chart library.
//!
//! Decode errors carry the element path (e.g. `data/info/bpm_info/bpm[2]/tick`)
//! so a broken chart can be located without re-reading the whole file.
//!
//! ## Error Types
//! - `MalformedXml` - The input is not well-formed XML
//! - `MissingElement` - A required schema element is absent
//! - `InvalidValue` - A scalar or enum code could not be decoded
//! - `InvalidDocument` - The decoded chart breaks a data-model invariant
//! - `Config` - Invalid editor configuration
//!
//! The first four together form the "malformed document" family; see
//! [`ChartError::is_malformed_document`].
//!
//! ## Usage
//! ```rust
//! use seq9::{decode, ChartError};
//!
//! match decode("<data>") {
//!     Ok(doc) => println!("{} notes", doc.notes.len()),
//!     Err(ChartError::MissingElement { path }) => eprintln!("missing {}", path),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    /// The input could not be parsed as XML.
    ///
    /// # Example
    /// ```
    /// # use seq9::ChartError;
    /// let err = ChartError::MalformedXml {
    ///     message: "unexpected end of input".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Malformed XML: unexpected end of input");
    /// ```
    #[error("Malformed XML: {message}")]
    MalformedXml { message: String },

    /// A required element was not found at its schema path.
    ///
    /// # Example
    /// ```
    /// # use seq9::ChartError;
    /// let err = ChartError::MissingElement {
    ///     path: "data/info/time_unit".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Missing required element: data/info/time_unit");
    /// ```
    #[error("Missing required element: {path}")]
    MissingElement { path: String },

    /// An element was present but its text could not be decoded.
    #[error("Invalid value at {path}: expected {expected}, found '{value}'")]
    InvalidValue {
        path: String,
        value: String,
        expected: String,
    },

    /// The chart decoded fine but breaks a data-model invariant.
    ///
    /// # Example
    /// ```
    /// # use seq9::ChartError;
    /// let err = ChartError::InvalidDocument {
    ///     path: "data/info/bpm_info/bpm[0]".to_string(),
    ///     message: "first tempo point must be at tick 0".to_string(),
    /// };
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Invalid document at data/info/bpm_info/bpm[0]: first tempo point must be at tick 0"
    /// );
    /// ```
    #[error("Invalid document at {path}: {message}")]
    InvalidDocument { path: String, message: String },

    /// Invalid editor configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ChartError {
    /// True for every error that means "this input is not a usable seq9 document".
    pub fn is_malformed_document(&self) -> bool {
        !matches!(self, ChartError::Config(_))
    }

    pub(crate) fn invalid_document(path: impl Into<String>, message: impl Into<String>) -> Self {
        ChartError::InvalidDocument {
            path: path.into(),
            message: message.into(),
        }
    }
}
