//! FlatJSON Format - Core primitives for pre-built JSON flat indexes
//!
//! This crate provides the fundamental encoding/decoding utilities for the
//! FlatJSON text format with no I/O dependencies. It includes:
//!
//! - Marker characters and header keys
//! - The JSON value model
//! - Single-line codec (depth, key token, jump marker or inline value)
//! - Header line and body hash envelope (MD5 / SHA-256)
//! - Slash-delimited path syntax
//! - Error types
//! - Resource limits

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod checksum;
pub mod constants;
pub mod error;
pub mod header;
pub mod limits;
pub mod line;
pub mod path;
pub mod types;
pub mod value;

// Re-export commonly used types
pub use checksum::HashAlgorithm;
pub use error::{ErrorKind, FlatError, Result};
pub use header::{Envelope, FileHeader};
pub use limits::Limits;
pub use line::{Key, LineRef, Payload};
pub use path::KeyPath;
pub use types::ContainerKind;
pub use value::Value;

/// Format version tag this build reads and writes.
pub fn format_version() -> &'static str {
    constants::FORMAT_VERSION
}
