//! Header line and hash envelope
//!
//! The first line of an encoded document is a set of `KEY>VALUE` pairs joined
//! by `|`, for example
//!
//! ```text
//! FV>1.0|HASH_ALGO>SHA-256|HASH>9f86...|ROOT>object|LINES>42
//! ```
//!
//! `HASH` covers the body: every following line joined by `\n`, with no
//! trailing newline.

use crate::checksum::HashAlgorithm;
use crate::constants::{
    DEPTH_MARKER, FORMAT_VERSION, HEADER_FIELD_SEPARATOR, HEADER_FORMAT_VERSION, HEADER_HASH,
    HEADER_HASH_ALGO, HEADER_KEY_SEPARATOR, HEADER_LINES, HEADER_ROOT,
};
use crate::error::{FlatError, Result};
use crate::types::ContainerKind;

/// Decoded header line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    /// Format version tag (`FV`)
    pub format_version: String,
    /// Body hash algorithm (`HASH_ALGO`)
    pub hash_algorithm: HashAlgorithm,
    /// Hex digest of the body (`HASH`)
    pub hash: String,
    /// Root container kind (`ROOT`), optional on input
    pub root: Option<ContainerKind>,
    /// Body line count (`LINES`), optional on input
    pub line_count: Option<usize>,
    /// Fields this version does not interpret, kept in input order
    pub extra: Vec<(String, String)>,
}

impl FileHeader {
    /// Header describing `body` under `algorithm`.
    pub fn for_body(
        body: &str,
        line_count: usize,
        root: ContainerKind,
        algorithm: HashAlgorithm,
    ) -> Self {
        Self {
            format_version: FORMAT_VERSION.to_string(),
            hash_algorithm: algorithm,
            hash: algorithm.digest_hex(body),
            root: Some(root),
            line_count: Some(line_count),
            extra: Vec::new(),
        }
    }

    /// Encode to a single header line (no newline).
    pub fn encode(&self) -> String {
        let mut fields: Vec<(String, String)> = vec![
            (HEADER_FORMAT_VERSION.to_string(), self.format_version.clone()),
            (
                HEADER_HASH_ALGO.to_string(),
                self.hash_algorithm.name().to_string(),
            ),
            (HEADER_HASH.to_string(), self.hash.clone()),
        ];
        if let Some(root) = self.root {
            fields.push((HEADER_ROOT.to_string(), root.name().to_string()));
        }
        if let Some(lines) = self.line_count {
            fields.push((HEADER_LINES.to_string(), lines.to_string()));
        }
        fields.extend(self.extra.iter().cloned());

        fields
            .iter()
            .map(|(key, value)| format!("{}{}{}", key, HEADER_KEY_SEPARATOR, value))
            .collect::<Vec<_>>()
            .join(&HEADER_FIELD_SEPARATOR.to_string())
    }

    /// Decode a header line, checking the format version and hash algorithm.
    pub fn decode(line: &str) -> Result<Self> {
        let line = line.trim_end_matches('\r');
        if line.is_empty() || line.starts_with(DEPTH_MARKER) {
            return Err(FlatError::MissingHeader);
        }

        let mut format_version = None;
        let mut hash_algorithm = None;
        let mut hash = None;
        let mut root = None;
        let mut line_count = None;
        let mut extra = Vec::new();

        for field in line.split(HEADER_FIELD_SEPARATOR) {
            let (key, value) = field.split_once(HEADER_KEY_SEPARATOR).ok_or_else(|| {
                FlatError::MalformedHeader(format!("field '{}' has no '{}'", field, HEADER_KEY_SEPARATOR))
            })?;
            match key {
                HEADER_FORMAT_VERSION => format_version = Some(value.to_string()),
                HEADER_HASH_ALGO => hash_algorithm = Some(value.to_string()),
                HEADER_HASH => hash = Some(value.to_string()),
                HEADER_ROOT => root = Some(value.parse::<ContainerKind>()?),
                HEADER_LINES => {
                    line_count = Some(value.parse::<usize>().map_err(|e| {
                        FlatError::MalformedHeader(format!("invalid line count '{}': {}", value, e))
                    })?)
                }
                _ => extra.push((key.to_string(), value.to_string())),
            }
        }

        let format_version = format_version.ok_or_else(|| {
            FlatError::MalformedHeader(format!("missing {} field", HEADER_FORMAT_VERSION))
        })?;
        if format_version != FORMAT_VERSION {
            return Err(FlatError::FormatVersionMismatch {
                expected: FORMAT_VERSION,
                found: format_version,
            });
        }
        let hash_algorithm = hash_algorithm
            .ok_or_else(|| {
                FlatError::MalformedHeader(format!("missing {} field", HEADER_HASH_ALGO))
            })?
            .parse::<HashAlgorithm>()?;
        let hash = hash
            .ok_or_else(|| FlatError::MalformedHeader(format!("missing {} field", HEADER_HASH)))?;

        Ok(Self {
            format_version,
            hash_algorithm,
            hash,
            root,
            line_count,
            extra,
        })
    }
}

/// Body lines with their validated header
#[derive(Debug, Clone)]
pub struct Envelope {
    /// Decoded header
    pub header: FileHeader,
    /// Body lines, header excluded
    pub lines: Vec<String>,
}

impl Envelope {
    /// Root kind from the header, else inferred from the first body line.
    pub fn root(&self) -> ContainerKind {
        self.header.root.unwrap_or_else(|| {
            ContainerKind::from_is_array(
                self.lines
                    .first()
                    .is_some_and(|line| crate::line::is_array_line(line)),
            )
        })
    }
}

/// Prepend a header to `lines` and return the full encoded text.
pub fn seal(lines: &[String], root: ContainerKind, algorithm: HashAlgorithm) -> String {
    let body = lines.join("\n");
    let header = FileHeader::for_body(&body, lines.len(), root, algorithm);
    let mut text = header.encode();
    if !lines.is_empty() {
        text.push('\n');
        text.push_str(&body);
    }
    text
}

/// Split encoded text into lines, dropping `\r` line endings and a trailing blank line.
pub fn split_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect();
    remove_trailing_empty(&mut lines);
    lines
}

fn remove_trailing_empty(lines: &mut Vec<String>) {
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
}

/// Validate the header of `lines` and split off the body.
///
/// With `verify_hash` the body hash is recomputed and compared, and the
/// declared line count (when present) must match.
pub fn unseal(mut lines: Vec<String>, verify_hash: bool) -> Result<Envelope> {
    remove_trailing_empty(&mut lines);
    if lines.is_empty() {
        return Err(FlatError::MissingHeader);
    }
    let header = FileHeader::decode(&lines[0])?;
    lines.remove(0);

    if verify_hash {
        let body = lines.join("\n");
        header.hash_algorithm.verify(&body, &header.hash)?;
        if let Some(declared) = header.line_count {
            if declared != lines.len() {
                return Err(FlatError::MalformedHeader(format!(
                    "header declares {} lines, body has {}",
                    declared,
                    lines.len()
                )));
            }
        }
    }

    Ok(Envelope { header, lines })
}
