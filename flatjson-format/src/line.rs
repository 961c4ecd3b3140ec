//! Single-line codec for the flat index body
//!
//! A body line is laid out as
//!
//! ```text
//! <depth markers><key token>(<jump-open><count> | <value-sep><json>)
//! ```
//!
//! where the key token is either a JSON-quoted object key or `[i]` for an
//! array index. The key token is matched by byte prefix during resolution, so
//! its encoding must be exactly reproducible from a query segment.

use std::fmt;

use crate::constants::{
    DEPTH_MARKER, DEPTH_MARKER_BYTE, EMPTY_ARRAY, EMPTY_OBJECT, JUMP_MARKER_OPEN,
    JUMP_MARKER_OPEN_BYTE, VALUE_SEPARATOR, VALUE_SEPARATOR_BYTE,
};
use crate::error::{FlatError, Result};
use crate::value::Value;

/// Key of a line, decoded from its key token
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// Object member name
    Name(String),
    /// Array position
    Index(usize),
}

impl Key {
    /// Encoded key token.
    pub fn token(&self) -> String {
        match self {
            Key::Name(name) => name_token(name),
            Key::Index(idx) => index_token(*idx),
        }
    }

    /// Key as a JSON value: string for names, integer for indices.
    pub fn to_value(&self) -> Value {
        match self {
            Key::Name(name) => Value::String(name.clone()),
            Key::Index(idx) => Value::Int(*idx as i64),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Name(name) => f.write_str(name),
            Key::Index(idx) => write!(f, "{}", idx),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(name.to_string())
    }
}

impl From<usize> for Key {
    fn from(idx: usize) -> Self {
        Key::Index(idx)
    }
}

/// Key token for an object member: the JSON-quoted name.
pub fn name_token(name: &str) -> String {
    // Serializing a str cannot fail.
    serde_json::to_string(name).unwrap_or_default()
}

/// Key token for an array position.
pub fn index_token(idx: usize) -> String {
    format!("[{}]", idx)
}

/// Payload carried after the key token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload<'a> {
    /// Container line: number of lines in its subtree.
    Jump(usize),
    /// Scalar or empty container, as compact JSON text.
    Inline(&'a str),
}

impl Payload<'_> {
    /// True for an inline `{}` or `[]`.
    pub fn is_empty_container(&self) -> bool {
        matches!(self, Payload::Inline(text) if *text == EMPTY_OBJECT || *text == EMPTY_ARRAY)
    }
}

/// Borrowed, decoded view of one body line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRef<'a> {
    /// Nesting level; root children are at depth 1
    pub depth: usize,
    /// Key token exactly as written (`"name"` or `[i]`)
    pub key_token: &'a str,
    /// Jump count or inline value
    pub payload: Payload<'a>,
}

impl<'a> LineRef<'a> {
    /// Decode `line`; `line_no` is only used for error reporting.
    pub fn parse(line: &'a str, line_no: usize) -> Result<Self> {
        let depth = depth_of(line);
        let key_len = key_token_len(&line[depth..]).ok_or_else(|| FlatError::MalformedLine {
            line: line_no,
            message: "missing or unterminated key token".to_string(),
        })?;
        let key_end = depth + key_len;
        let key_token = &line[depth..key_end];
        let rest = &line[key_end..];

        let payload = match rest.as_bytes().first() {
            Some(&JUMP_MARKER_OPEN_BYTE) => {
                let count = rest[1..]
                    .trim_end()
                    .parse::<usize>()
                    .map_err(|e| FlatError::MalformedLine {
                        line: line_no,
                        message: format!("invalid jump count '{}': {}", &rest[1..], e),
                    })?;
                Payload::Jump(count)
            }
            Some(&VALUE_SEPARATOR_BYTE) => Payload::Inline(rest[1..].trim()),
            _ => {
                return Err(FlatError::MalformedLine {
                    line: line_no,
                    message: "expected a jump marker or value separator after the key".to_string(),
                })
            }
        };

        Ok(Self {
            depth,
            key_token,
            payload,
        })
    }

    /// Jump count of a container line.
    pub fn jump(&self) -> Option<usize> {
        match self.payload {
            Payload::Jump(count) => Some(count),
            Payload::Inline(_) => None,
        }
    }

    /// True when the key token is an array index.
    pub fn is_array_entry(&self) -> bool {
        self.key_token.starts_with('[')
    }

    /// Decode the key token.
    pub fn key(&self, line_no: usize) -> Result<Key> {
        decode_key_token(self.key_token).ok_or_else(|| FlatError::MalformedLine {
            line: line_no,
            message: format!("undecodable key token {}", self.key_token),
        })
    }

    /// Decode the inline payload into a value.
    ///
    /// Returns `None` for container lines.
    pub fn inline_value(&self, line_no: usize) -> Result<Option<Value>> {
        match self.payload {
            Payload::Jump(_) => Ok(None),
            Payload::Inline(text) => {
                let parsed: serde_json::Value =
                    serde_json::from_str(text).map_err(|e| FlatError::MalformedLine {
                        line: line_no,
                        message: format!("invalid inline value '{}': {}", text, e),
                    })?;
                Ok(Some(Value::from(parsed)))
            }
        }
    }
}

/// Count of leading depth markers.
pub fn depth_of(line: &str) -> usize {
    line.bytes().take_while(|&b| b == DEPTH_MARKER_BYTE).count()
}

/// True when the key token of `line` is an array index.
pub fn is_array_line(line: &str) -> bool {
    line.as_bytes().get(depth_of(line)) == Some(&b'[')
}

/// Length in bytes of the key token at the start of `s`.
fn key_token_len(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    match bytes.first()? {
        b'[' => bytes.iter().position(|&b| b == b']').map(|end| end + 1),
        b'"' => {
            let mut pos = 1;
            while pos < bytes.len() {
                match bytes[pos] {
                    b'\\' => pos += 2,
                    b'"' => return Some(pos + 1),
                    _ => pos += 1,
                }
            }
            None
        }
        _ => None,
    }
}

/// Decode a key token into a [`Key`].
pub fn decode_key_token(token: &str) -> Option<Key> {
    if let Some(inner) = token.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        if inner.is_empty() || !inner.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        return inner.parse().ok().map(Key::Index);
    }
    serde_json::from_str::<String>(token).ok().map(Key::Name)
}

/// Write the depth markers and key token of a line.
pub fn write_line_head(buf: &mut String, depth: usize, key_token: &str) {
    buf.reserve(depth + key_token.len());
    for _ in 0..depth {
        buf.push(DEPTH_MARKER);
    }
    buf.push_str(key_token);
}

/// Append a jump marker to a line head.
pub fn push_jump(buf: &mut String, count: usize) {
    buf.push(JUMP_MARKER_OPEN);
    buf.push_str(&count.to_string());
}

/// Append an inline JSON payload to a line head.
pub fn push_inline(buf: &mut String, json: &str) {
    buf.push(VALUE_SEPARATOR);
    buf.push_str(json);
}

/// Byte prefix a line must start with to hold `key_token` at `depth`.
pub fn search_pattern(depth: usize, key_token: &str) -> String {
    let mut pattern = String::new();
    write_line_head(&mut pattern, depth, key_token);
    pattern
}

/// True when `line` holds exactly `pattern` as its head.
///
/// The byte after the pattern must be a payload marker, so `"ab"` never
/// matches a line keyed `"abc"`.
pub fn matches_head(line: &str, pattern: &str) -> bool {
    line.as_bytes().starts_with(pattern.as_bytes())
        && matches!(
            line.as_bytes().get(pattern.len()),
            Some(&JUMP_MARKER_OPEN_BYTE) | Some(&VALUE_SEPARATOR_BYTE)
        )
}
