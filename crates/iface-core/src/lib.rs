//! Proxmox VE Interface Core
//!
//! Shared types, boolean codec table and error taxonomy for node network
//! interface management

pub mod codec;
pub mod error;
pub mod types;

pub use error::{IfaceError, TransportError, TransportErrorKind, ValidationError};
pub use types::*;

/// Result type for interface operations
pub type Result<T> = std::result::Result<T, IfaceError>;
