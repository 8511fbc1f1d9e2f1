//! BINN Format - Core primitives for the BINN binary serialization format
//!
//! This crate provides the wire-level building blocks with no buffer
//! management. It includes:
//!
//! - Type bytes and size constants
//! - Type tags, storage classes and container kinds
//! - Short/long form size and count fields
//! - Container header encoding/decoding
//! - Integer width compression
//! - Error types
//! - Validation limits

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod constants;
pub mod error;
pub mod header;
pub mod integer;
pub mod limits;
pub mod types;
pub mod varint;

// Re-export commonly used types
pub use error::{BinnError, Result};
pub use header::ContainerHeader;
pub use limits::Limits;
pub use types::{ContainerKind, Family, StorageClass, TypeTag};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_bounds_agree_with_fields() {
        let smallest = ContainerHeader::for_body(ContainerKind::Object, 0, 0).unwrap();
        assert_eq!(smallest.encoded_len(), constants::MIN_HEADER_SIZE);

        let largest = ContainerHeader::for_body(ContainerKind::Object, 1 << 20, 1 << 10).unwrap();
        assert_eq!(largest.encoded_len(), constants::MAX_HEADER_SIZE);
    }
}
