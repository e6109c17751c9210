//! Layered error definitions
//!
//! Categorized by source: config / registry / conversion / stream.
//! Everything in here is fatal for the run: a mismatch between declared
//! records and configured collections cannot be resolved at runtime.

use thiserror::Error;

use crate::{CollectionKind, SegmentKind};

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Registry Errors =====
    /// A record referenced a collection name that was never configured
    #[error("no output collection named '{name}' was configured")]
    CollectionNotFound { name: String },

    /// Two collection descriptors share a name
    #[error("duplicate output collection name: '{name}'")]
    DuplicateCollection { name: String },

    /// A collection was accessed as the wrong kind
    #[error("collection '{name}' holds {actual:?} entries, not {expected:?}")]
    KindMismatch {
        name: String,
        expected: CollectionKind,
        actual: CollectionKind,
    },

    // ===== Conversion Errors =====
    /// A deposit container carried a data_type tag with no converter
    #[error("record '{record}' carries unconvertible deposit type {kind:?}")]
    UnknownDepositKind { record: String, kind: SegmentKind },

    /// A sub-processor of the wrong kind was wired into the output stage
    #[error("invalid processor '{name}' for output stage: kind '{kind}'")]
    InvalidProcessor { name: String, kind: String },

    // ===== Stream Errors =====
    /// Commit was requested while no output stream is open
    #[error("failed to write output file: stream is not open")]
    StreamNotOpen,

    /// The persistence backend rejected an operation
    #[error("writer backend error: {message}")]
    Backend { message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create backend error
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}
