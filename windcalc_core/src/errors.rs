//! # Error Types
//!
//! Structured error types for windcalc_core. Errors carry enough context for a
//! caller (CLI, JSON API, another program) to tell the user what to fix.
//!
//! Two conditions are deliberately *not* errors:
//!
//! - A missing spacing table for a wind speed. The selector falls back to the
//!   bending formula and reports `method = "formula"`.
//! - An inadequate post when strict footing mode is off. The estimate is
//!   returned with `adequate = false` and status RED.
//!
//! ## Example
//!
//! ```rust
//! use windcalc_core::errors::{CalcError, CalcResult};
//!
//! fn validate_spacing(spacing_ft: f64) -> CalcResult<()> {
//!     if !(spacing_ft > 0.0) {
//!         return Err(CalcError::invalid_input(
//!             "post_spacing_ft",
//!             spacing_ft.to_string(),
//!             "Post spacing must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_spacing(-2.0).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for windcalc_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for estimate operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (non-positive, non-finite, unknown code)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// No catalog post satisfies the demand and strict footing mode is on
    #[error("Structural inadequacy: no {group} {role} post satisfies demand ({demand}) - {reason}")]
    StructuralInadequacy {
        role: String,
        group: String,
        demand: String,
        reason: String,
    },

    /// Post key not present in the catalog
    #[error("Post not found: {key}")]
    PostNotFound { key: String },

    /// Catalog data violates an invariant (ordering, section properties)
    #[error("Catalog error: {reason}")]
    CatalogError { reason: String },

    /// Spacing table source could not be parsed
    #[error("Table error in '{path}': {reason}")]
    TableError { path: String, reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a StructuralInadequacy error
    pub fn structural_inadequacy(
        role: impl Into<String>,
        group: impl Into<String>,
        demand: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CalcError::StructuralInadequacy {
            role: role.into(),
            group: group.into(),
            demand: demand.into(),
            reason: reason.into(),
        }
    }

    /// Create a PostNotFound error
    pub fn post_not_found(key: impl Into<String>) -> Self {
        CalcError::PostNotFound { key: key.into() }
    }

    /// Create a CatalogError
    pub fn catalog(reason: impl Into<String>) -> Self {
        CalcError::CatalogError { reason: reason.into() }
    }

    /// Create a TableError
    pub fn table(path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::TableError {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Check if the caller can fix the input and retry
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CalcError::InvalidInput { .. } | CalcError::PostNotFound { .. })
    }

    /// Check if this error means the design must not be presented as valid
    pub fn is_structural(&self) -> bool {
        matches!(self, CalcError::StructuralInadequacy { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::StructuralInadequacy { .. } => "STRUCTURAL_INADEQUACY",
            CalcError::PostNotFound { .. } => "POST_NOT_FOUND",
            CalcError::CatalogError { .. } => "CATALOG_ERROR",
            CalcError::TableError { .. } => "TABLE_ERROR",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(e: serde_json::Error) -> Self {
        CalcError::SerializationError { reason: e.to_string() }
    }
}

/// Reject zero, negative and non-finite values for a named field.
pub(crate) fn require_positive(field: &str, value: f64) -> CalcResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CalcError::invalid_input(field, value.to_string(), "Must be a positive, finite number"))
    }
}
