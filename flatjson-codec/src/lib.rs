//! flatjson codec - encoder, resolver and materializer
//!
//! This crate turns JSON documents into flat index lines and answers path
//! queries against them:
//!
//! - [`FlatEncoder`] flattens a document and annotates jump counts
//! - [`Resolver`] walks path segments without rebuilding containers
//! - [`Materializer`] rebuilds the value of a line range on demand

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod encoder;
pub mod materialize;
pub mod resolve;

// Re-export commonly used types
pub use flatjson_format::{
    ContainerKind, FlatError, HashAlgorithm, Key, KeyPath, Limits, Result, Value,
};

// Re-export our own types
pub use encoder::{encode_json_str, encode_value, EncodedDocument, FlatEncoder};
pub use materialize::{materialize_document, range_kind, Materializer};
pub use resolve::{ContainerSlice, Resolver};
