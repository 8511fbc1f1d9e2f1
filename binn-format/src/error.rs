//! Error types for the BINN format

use crate::types::{ContainerKind, TypeTag};
use std::collections::TryReserveError;
use thiserror::Error;

/// BINN error types
#[derive(Debug, Error)]
pub enum BinnError {
    /// A pre-allocated buffer cannot hold the encoded entry.
    #[error("Out of space: need {needed} bytes, capacity is {capacity}")]
    OutOfSpace {
        /// Total bytes the buffer would need after the write.
        needed: usize,
        /// Fixed capacity of the buffer.
        capacity: usize,
    },
    /// Growing an owned buffer failed.
    #[error("Allocation failed: {0}")]
    Allocation(#[from] TryReserveError),
    /// A configured or format limit was exceeded.
    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),
    /// Operation does not apply to this container kind.
    #[error("Kind mismatch: expected {expected}, found {actual}")]
    KindMismatch {
        /// Kind the operation works on.
        expected: ContainerKind,
        /// Kind of the value the operation was invoked against.
        actual: ContainerKind,
    },
    /// Strict set on a key that is already present.
    #[error("Key already present: {0}")]
    KeyExists(String),
    /// Position or key not present in the container.
    #[error("Not found")]
    NotFound,
    /// Stored type does not belong to the requested family.
    #[error("Type mismatch: expected {expected}, found {found:?}")]
    TypeMismatch {
        /// Family the accessor reads.
        expected: &'static str,
        /// Tag actually stored.
        found: TypeTag,
    },
    /// Stored number cannot be represented at the requested width.
    #[error("Value of type {found:?} out of range for {target}")]
    OutOfRange {
        /// Tag actually stored.
        found: TypeTag,
        /// Requested Rust type.
        target: &'static str,
    },
    /// Key rejected before encoding.
    #[error("Invalid key: {0}")]
    InvalidKey(String),
    /// Buffer contents violate the wire format.
    #[error("Malformed buffer: {0}")]
    Malformed(String),
    /// Buffer ends before a declared field.
    #[error("Unexpected end of buffer")]
    UnexpectedEof,
    /// Type byte is not part of the format.
    #[error("Unknown type byte: {0:#04x}")]
    UnknownType(u8),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, BinnError>;
