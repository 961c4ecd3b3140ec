//! Rebuild JSON values from contiguous line slices

use std::collections::BTreeMap;

use flatjson_format::line::{depth_of, is_array_line};
use flatjson_format::{ContainerKind, FlatError, Key, LineRef, Payload, Result, Value};

/// Kind of the container whose children occupy `lines[start..end]`.
///
/// An empty range carries no evidence and reads as an object.
pub fn range_kind(lines: &[String], start: usize, end: usize) -> ContainerKind {
    ContainerKind::from_is_array(start < end && is_array_line(&lines[start]))
}

/// End of the subtree announced at `idx`, bounded by `limit`.
fn subtree_end(idx: usize, count: usize, limit: usize) -> Result<usize> {
    idx.checked_add(1)
        .and_then(|start| start.checked_add(count))
        .filter(|end| *end <= limit)
        .ok_or(FlatError::CorruptJumpMarker { line: idx })
}

/// Materializer over the full body of an open index
///
/// Works on absolute line numbers so that errors name the real body line.
pub struct Materializer<'a> {
    lines: &'a [String],
}

impl<'a> Materializer<'a> {
    /// Create a materializer over `lines`.
    pub fn new(lines: &'a [String]) -> Self {
        Self { lines }
    }

    /// Rebuild the container whose children live in `lines[start..end]` at `base_depth`.
    pub fn container(
        &self,
        start: usize,
        end: usize,
        base_depth: usize,
        kind: ContainerKind,
    ) -> Result<Value> {
        if end > self.lines.len() || start > end {
            return Err(FlatError::CorruptJumpMarker {
                line: start.saturating_sub(1),
            });
        }

        let mut items = Vec::new();
        let mut members = BTreeMap::new();
        let mut idx = start;
        while idx < end {
            let raw = &self.lines[idx];
            // Deeper lines belong to a subtree that was already consumed.
            if depth_of(raw) != base_depth {
                idx += 1;
                continue;
            }

            let line = LineRef::parse(raw, idx)?;
            let (value, next) = match line.payload {
                Payload::Jump(count) => {
                    let sub_end = subtree_end(idx, count, end)?;
                    let sub_kind = range_kind(self.lines, idx + 1, sub_end);
                    let value = self.container(idx + 1, sub_end, base_depth + 1, sub_kind)?;
                    (value, sub_end)
                }
                Payload::Inline(_) => (line.inline_value(idx)?.unwrap_or_default(), idx + 1),
            };

            match kind {
                ContainerKind::Array => items.push(value),
                ContainerKind::Object => match line.key(idx)? {
                    Key::Name(name) => {
                        members.insert(name, value);
                    }
                    Key::Index(_) => {
                        return Err(FlatError::MalformedLine {
                            line: idx,
                            message: "array index key inside an object".to_string(),
                        })
                    }
                },
            }
            idx = next;
        }

        Ok(match kind {
            ContainerKind::Array => Value::Array(items),
            ContainerKind::Object => Value::Object(members),
        })
    }

    /// Rebuild the value held by the single line `idx`.
    pub fn line_value(&self, idx: usize) -> Result<Value> {
        let line = LineRef::parse(&self.lines[idx], idx)?;
        match line.payload {
            Payload::Jump(count) => {
                let end = subtree_end(idx, count, self.lines.len())?;
                let kind = range_kind(self.lines, idx + 1, end);
                self.container(idx + 1, end, line.depth + 1, kind)
            }
            Payload::Inline(_) => Ok(line.inline_value(idx)?.unwrap_or_default()),
        }
    }
}

/// Rebuild a whole document body.
pub fn materialize_document(lines: &[String], root: ContainerKind) -> Result<Value> {
    Materializer::new(lines).container(0, lines.len(), 1, root)
}
