//! Error types for GroundCheck.
//!
//! All errors are strongly typed using thiserror. Boundary-condition
//! errors (malformed inputs, missing resources) propagate; anything that
//! goes wrong inside a single verification degrades silently — a claim
//! that cannot be extracted is simply not extracted.

use thiserror::Error;

/// Validation errors that occur during input validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Trust value outside [0.0, 1.0].
    #[error("Trust value {value} for memory '{memory_id}' is out of range [0.0, 1.0]")]
    TrustOutOfRange {
        /// The offending memory id.
        memory_id: String,
        /// The invalid value.
        value: f64,
    },

    /// Memory text is empty.
    #[error("Memory '{memory_id}' has empty text")]
    EmptyMemoryText {
        /// The offending memory id.
        memory_id: String,
    },

    /// Verification mode string is not recognized.
    #[error("Unknown verification mode '{mode}' (expected 'strict' or 'permissive')")]
    UnknownMode {
        /// The unrecognized mode.
        mode: String,
    },
}

/// Errors loading the ontology tables at construction.
#[derive(Debug, Error)]
pub enum OntologyError {
    /// Ontology file absent.
    #[error("Ontology file not found: {path}")]
    Missing {
        /// Path that was probed.
        path: String,
    },

    /// Ontology file present but not valid JSON of the expected shape.
    #[error("Ontology file {path} is unparseable: {reason}")]
    Unparseable {
        /// Path of the bad file.
        path: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// A table parsed but contained no usable entries.
    #[error("Ontology table '{table}' is empty after skipping malformed entries")]
    EmptyTable {
        /// Name of the empty table.
        table: String,
    },
}

/// Top-level error type for GroundCheck.
#[derive(Debug, Error)]
pub enum GroundCheckError {
    /// Input validation failed.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Ontology tables could not be loaded.
    #[error("Ontology error: {0}")]
    Ontology(#[from] OntologyError),

    /// Neural matching was requested but no semantic matcher was injected.
    #[error("Semantic matcher unavailable: neural matching requested but no matcher was injected")]
    SemanticUnavailable,

    /// Internal system error.
    #[error("Internal error: {message}")]
    Internal {
        /// Error description.
        message: String,
    },
}

impl GroundCheckError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is an ontology error.
    #[must_use]
    pub const fn is_ontology(&self) -> bool {
        matches!(self, Self::Ontology(_))
    }
}

/// Result type alias for GroundCheck operations.
pub type GroundResult<T> = Result<T, GroundCheckError>;
