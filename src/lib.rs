//! Etag - Ordered record version identifiers
//!
//! This library provides the 128-bit etag used to version stored records:
//! its binary and text encodings, its total order, and the operations that
//! derive new etags from existing ones.

pub mod etag;
pub mod uuid_type;

pub use etag::*;
pub use uuid_type::UuidType;
