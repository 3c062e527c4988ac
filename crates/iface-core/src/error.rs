//! Error types for interface reconciliation and node API access

use thiserror::Error;

/// Main error type for interface operations
#[derive(Debug, Error)]
pub enum IfaceError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Declaration validation errors
///
/// Raised before any mutating API call; never retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} has to be between {min} and {max} but was {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("Interface {name} can only be present once in list")]
    DuplicateInterface { name: String },

    #[error("unsupported value for {field}: {value}")]
    UnsupportedValue { field: &'static str, value: String },
}

/// Failure of a single node API call, with the operation and node attached
#[derive(Debug, Error)]
#[error("{operation} on node {node} failed: {kind}")]
pub struct TransportError {
    pub operation: &'static str,
    pub node: String,
    #[source]
    pub kind: TransportErrorKind,
}

impl TransportError {
    pub fn new(operation: &'static str, node: &str, kind: TransportErrorKind) -> Self {
        Self {
            operation,
            node: node.to_string(),
            kind,
        }
    }
}

/// Underlying cause of a transport failure
#[derive(Debug, Error)]
pub enum TransportErrorKind {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("API returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected response body: {0}")]
    Decode(String),
}
