//! flatjson I/O - index instances, caches and file APIs
//!
//! This crate provides the user-facing layer of flatjson:
//!
//! - [`FlatIndex`], a lock-guarded instance holding one open document
//! - Query caches keyed by normalized path
//! - High-level build and open functions over strings and files

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod cache;
pub mod index;

// Re-export commonly used types
pub use cache::{CacheFlags, CacheKind, MemoTable, QueryCaches};
pub use flatjson_format::{
    ContainerKind, Envelope, ErrorKind, FileHeader, FlatError, HashAlgorithm, Key, KeyPath,
    Limits, Result, Value,
};
pub use index::FlatIndex;

use std::fs;
use std::path::Path;

use flatjson_codec::{encode_json_str, EncodedDocument};
use flatjson_format::header::{split_lines, unseal};
use flatjson_format::line::depth_of;
use tracing::{debug, warn};

/// Options for encoding JSON into a flat index
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Algorithm used for the body hash
    pub hash_algorithm: HashAlgorithm,
    /// Security limits
    pub limits: Limits,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            hash_algorithm: HashAlgorithm::Sha256,
            limits: Limits::default(),
        }
    }
}

/// Options for opening encoded text
#[derive(Debug, Clone)]
pub struct OpenOptions {
    /// Recompute and compare the body hash (recommended)
    pub verify_hash: bool,
    /// Security limits
    pub limits: Limits,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            verify_hash: true,
            limits: Limits::default(),
        }
    }
}

impl OpenOptions {
    /// Copy of these options with verification turned off when `ignore_hash` is set.
    pub fn ignoring_hash(&self, ignore_hash: bool) -> Self {
        Self {
            verify_hash: self.verify_hash && !ignore_hash,
            limits: self.limits.clone(),
        }
    }
}

/// Configuration of a [`FlatIndex`] instance
#[derive(Debug, Clone, Default)]
pub struct IndexOptions {
    /// Used by the `build_*` operations
    pub build: BuildOptions,
    /// Used by the `open_*` operations
    pub open: OpenOptions,
    /// Cache tables enabled on creation and after `clear`
    pub cache_flags: CacheFlags,
}

/// Outcome of writing an encoded document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    /// Body lines written, header excluded
    pub lines: usize,
    /// Non-root containers in the document
    pub containers: usize,
    /// Bytes of encoded text written
    pub bytes: usize,
}

fn encode(json: &str, opts: &BuildOptions) -> Result<(String, BuildSummary)> {
    let doc: EncodedDocument = encode_json_str(json, &opts.limits)?;
    let text = doc.seal(opts.hash_algorithm);
    let summary = BuildSummary {
        lines: doc.lines.len(),
        containers: doc.container_count,
        bytes: text.len(),
    };
    Ok((text, summary))
}

/// Encode JSON text into flat index text, header included.
pub fn build_string(json: &str, opts: &BuildOptions) -> Result<String> {
    encode(json, opts).map(|(text, _)| text)
}

/// Encode the JSON file at `input` and return the flat index text.
pub fn build_file(input: &Path, opts: &BuildOptions) -> Result<String> {
    let json = fs::read_to_string(input)?;
    build_string(&json, opts)
}

/// Encode the JSON file at `input` and write the flat index to `output`.
pub fn build_file_to(input: &Path, output: &Path, opts: &BuildOptions) -> Result<BuildSummary> {
    let json = fs::read_to_string(input)?;
    let (text, summary) = encode(&json, opts)?;
    fs::write(output, &text)?;
    debug!(
        input = %input.display(),
        output = %output.display(),
        lines = summary.lines,
        bytes = summary.bytes,
        "wrote flat index"
    );
    Ok(summary)
}

/// Validate encoded lines and split them into header and body.
pub fn open_lines(lines: Vec<String>, opts: &OpenOptions) -> Result<Envelope> {
    if !opts.verify_hash {
        warn!("opening flat index without hash verification");
    }
    let envelope = unseal(lines, opts.verify_hash)?;
    opts.limits.check_lines(envelope.lines.len())?;
    for line in &envelope.lines {
        opts.limits.check_depth(depth_of(line))?;
    }
    debug!(
        lines = envelope.lines.len(),
        hash_algorithm = %envelope.header.hash_algorithm,
        verified = opts.verify_hash,
        "opened flat index"
    );
    Ok(envelope)
}

/// Validate encoded text.
pub fn open_string(text: &str, opts: &OpenOptions) -> Result<Envelope> {
    open_lines(split_lines(text), opts)
}

/// Read and validate the flat index file at `path`.
pub fn open_file(path: &Path, opts: &OpenOptions) -> Result<Envelope> {
    let text = fs::read_to_string(path)?;
    open_string(&text, opts)
}

/// Format version written into every header.
pub fn format_version() -> &'static str {
    flatjson_format::format_version()
}
