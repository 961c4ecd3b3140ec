//! Error types for the FlatJSON format

use thiserror::Error;

/// Flat classification of a [`FlatError`], stable across message changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input text was not valid JSON.
    JsonParse,
    /// Document root was neither an object nor an array.
    UnsupportedType,
    /// A file could not be opened, read or written.
    FileAccess,
    /// Reload requested without a previously opened file.
    FileNotOpen,
    /// Query issued before any data was opened.
    DataNotOpen,
    /// A body line or inline value could not be decoded.
    ValueParse,
    /// Path segment missing, non-integer array index, or scalar where a container was expected.
    InvalidPath,
    /// Jump marker points beyond the available lines.
    LineInJumpMarker,
    /// Header line missing or malformed.
    FileHeader,
    /// Unknown hash algorithm or hash mismatch.
    Hash,
    /// Format version mismatch.
    Format,
    /// A configured limit was exceeded.
    Limit,
}

/// FlatJSON error types
#[derive(Debug, Error)]
pub enum FlatError {
    /// Input text was not valid JSON.
    #[error("JSON parse error at line {line}, column {column}: {message}")]
    JsonParse {
        /// Parser message
        message: String,
        /// 1-based line of the error
        line: usize,
        /// 1-based column of the error
        column: usize,
    },
    /// Top-level JSON value must be an object or an array.
    #[error("Unsupported root type: top-level JSON data must be an object or an array, found {0}")]
    UnsupportedRoot(&'static str),
    /// I/O operation failed while reading or writing data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// `reload_file` called without a file-backed open.
    #[error("No file is open")]
    NoFileOpen,
    /// Query issued before any data was opened.
    #[error("No data is open")]
    NoDataOpen,
    /// Path could not be resolved.
    #[error("Invalid path '{path}': {message}")]
    InvalidPath {
        /// Full query path as given
        path: String,
        /// What went wrong, naming the offending segment
        message: String,
    },
    /// A jump marker spans past the end of the available lines.
    #[error("Corrupted jump marker on line {line}")]
    CorruptJumpMarker {
        /// 0-based body line of the container
        line: usize,
    },
    /// A body line could not be decoded.
    #[error("Malformed line {line}: {message}")]
    MalformedLine {
        /// 0-based body line
        line: usize,
        /// Decoder message
        message: String,
    },
    /// Input has no header line.
    #[error("Missing file header")]
    MissingHeader,
    /// Header line is present but not well formed.
    #[error("Malformed file header: {0}")]
    MalformedHeader(String),
    /// Header names a hash algorithm this build does not know.
    #[error("Unknown hash algorithm: {0}")]
    UnknownHashAlgorithm(String),
    /// Recomputed body hash differs from the header.
    #[error("Hash verification failed: expected {expected}, computed {actual}")]
    HashMismatch {
        /// Hash declared in the header
        expected: String,
        /// Hash computed over the body
        actual: String,
    },
    /// Header declares a format version other than [`crate::constants::FORMAT_VERSION`].
    #[error("Format version mismatch: expected {expected}, found {found}")]
    FormatVersionMismatch {
        /// Version this build reads and writes
        expected: &'static str,
        /// Version declared in the header
        found: String,
    },
    /// A configured limit was exceeded.
    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),
}

impl FlatError {
    /// Build an [`FlatError::InvalidPath`] for `path`.
    pub fn invalid_path(path: impl Into<String>, message: impl Into<String>) -> Self {
        FlatError::InvalidPath {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Flat error classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FlatError::JsonParse { .. } => ErrorKind::JsonParse,
            FlatError::UnsupportedRoot(_) => ErrorKind::UnsupportedType,
            FlatError::Io(_) => ErrorKind::FileAccess,
            FlatError::NoFileOpen => ErrorKind::FileNotOpen,
            FlatError::NoDataOpen => ErrorKind::DataNotOpen,
            FlatError::InvalidPath { .. } => ErrorKind::InvalidPath,
            FlatError::CorruptJumpMarker { .. } => ErrorKind::LineInJumpMarker,
            FlatError::MalformedLine { .. } => ErrorKind::ValueParse,
            FlatError::MissingHeader | FlatError::MalformedHeader(_) => ErrorKind::FileHeader,
            FlatError::UnknownHashAlgorithm(_) | FlatError::HashMismatch { .. } => ErrorKind::Hash,
            FlatError::FormatVersionMismatch { .. } => ErrorKind::Format,
            FlatError::LimitExceeded(_) => ErrorKind::Limit,
        }
    }

    /// Line associated with the error, when there is one.
    ///
    /// JSON parse errors report the 1-based input line; body errors report the
    /// 0-based body line.
    pub fn line(&self) -> Option<usize> {
        match self {
            FlatError::JsonParse { line, .. } => Some(*line),
            FlatError::CorruptJumpMarker { line } | FlatError::MalformedLine { line, .. } => {
                Some(*line)
            }
            _ => None,
        }
    }
}

impl From<serde_json::Error> for FlatError {
    fn from(err: serde_json::Error) -> Self {
        FlatError::JsonParse {
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, FlatError>;
