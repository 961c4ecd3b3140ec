//! Slash-delimited query paths
//!
//! Segments are separated by `/`; `\` escapes the next character, so `\/`
//! is a literal slash and `\\` a literal backslash. Any other escaped
//! character is taken literally, and a lone trailing `\` stands for itself.
//! Trailing unescaped slashes are ignored and an empty path names the root.

use std::fmt;

use smallvec::SmallVec;

use crate::constants::{PATH_ESCAPE, PATH_SEPARATOR};
use crate::error::{FlatError, Result};

/// Parsed query path
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPath {
    segments: SmallVec<[String; 4]>,
}

impl KeyPath {
    /// The root path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse `input`, rejecting empty interior segments.
    pub fn parse(input: &str) -> Result<Self> {
        let mut segments: SmallVec<[String; 4]> = SmallVec::new();
        let mut current = String::new();
        // Whether `current` was started by content, as opposed to being the
        // implicit segment after a separator.
        let mut has_pending = false;
        let mut chars = input.chars();

        while let Some(c) = chars.next() {
            if c == PATH_ESCAPE {
                current.push(chars.next().unwrap_or(PATH_ESCAPE));
                has_pending = true;
            } else if c == PATH_SEPARATOR {
                segments.push(std::mem::take(&mut current));
                has_pending = false;
            } else {
                current.push(c);
                has_pending = true;
            }
        }
        if has_pending {
            segments.push(current);
        }

        while segments.last().is_some_and(|s| s.is_empty()) {
            segments.pop();
        }
        if segments.iter().any(|s| s.is_empty()) {
            return Err(FlatError::invalid_path(
                input,
                "path contains an empty segment",
            ));
        }

        Ok(Self { segments })
    }

    /// Build a path from already-unescaped segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// True for the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Unescaped segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True for the root path.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Canonical escaped text; parsing it yields `self` again.
    pub fn normalized(&self) -> String {
        join_segments(self.segments.iter().map(String::as_str))
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized())
    }
}

/// Escape one segment for inclusion in a path.
pub fn escape_segment(segment: &str, out: &mut String) {
    for c in segment.chars() {
        if c == PATH_ESCAPE || c == PATH_SEPARATOR {
            out.push(PATH_ESCAPE);
        }
        out.push(c);
    }
}

/// Escape and join raw segments with `/`.
pub fn join_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for (i, segment) in segments.into_iter().enumerate() {
        if i > 0 {
            out.push(PATH_SEPARATOR);
        }
        escape_segment(segment, &mut out);
    }
    out
}

/// Parse an array segment: ASCII digits only, no sign.
pub fn parse_index_segment(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segs(input: &str) -> Vec<String> {
        KeyPath::parse(input).unwrap().segments().to_vec()
    }

    #[test]
    fn test_root_forms() {
        assert!(KeyPath::parse("").unwrap().is_root());
        assert!(KeyPath::parse("/").unwrap().is_root());
        assert!(KeyPath::parse("//").unwrap().is_root());
    }

    #[test]
    fn test_plain_and_trailing_slash() {
        assert_eq!(segs("a/b/0"), vec!["a", "b", "0"]);
        assert_eq!(segs("a/b/"), vec!["a", "b"]);
    }

    #[test]
    fn test_escapes() {
        assert_eq!(segs(r"a\/b/c"), vec!["a/b", "c"]);
        assert_eq!(segs(r"a\\/b"), vec!["a\\", "b"]);
        assert_eq!(segs(r"\x"), vec!["x"]);
        assert_eq!(segs(r"end\"), vec!["end\\"]);
        // Escaped trailing slash is content, not a separator.
        assert_eq!(segs(r"a\/"), vec!["a/"]);
    }

    #[test]
    fn test_empty_segments_rejected() {
        for input in ["a//b", "/a"] {
            let err = KeyPath::parse(input).unwrap_err();
            assert!(matches!(err, FlatError::InvalidPath { .. }), "{input}");
        }
    }

    #[test]
    fn test_normalized_reparses() {
        let path = KeyPath::from_segments(["a/b", "c\\", "d"]);
        let text = path.normalized();
        assert_eq!(text, r"a\/b/c\\/d");
        assert_eq!(KeyPath::parse(&text).unwrap(), path);
        assert_eq!(KeyPath::parse("x/y/").unwrap().normalized(), "x/y");
    }

    #[test]
    fn test_index_segments() {
        assert_eq!(parse_index_segment("0"), Some(0));
        assert_eq!(parse_index_segment("007"), Some(7));
        assert_eq!(parse_index_segment("+1"), None);
        assert_eq!(parse_index_segment("-1"), None);
        assert_eq!(parse_index_segment("x"), None);
        assert_eq!(parse_index_segment(""), None);
    }
}
