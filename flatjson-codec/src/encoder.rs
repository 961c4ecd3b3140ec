//! Flattening encoder with jump annotation

use flatjson_format::header::seal;
use flatjson_format::line::{index_token, name_token, push_inline, push_jump, write_line_head};
use flatjson_format::{ContainerKind, FlatError, HashAlgorithm, Limits, Result, Value};
use tracing::debug;

/// Container line whose payload is decided by the annotation pass
#[derive(Debug, Clone, Copy)]
struct PendingContainer {
    line: usize,
    depth: usize,
    kind: ContainerKind,
}

/// Body lines of an encoded document, header not yet attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedDocument {
    /// Body lines in canonical order
    pub lines: Vec<String>,
    /// Root container kind
    pub root: ContainerKind,
    /// Number of non-root containers, empty ones included
    pub container_count: usize,
}

impl EncodedDocument {
    /// Attach a header and return the complete encoded text.
    pub fn seal(&self, algorithm: HashAlgorithm) -> String {
        seal(&self.lines, self.root, algorithm)
    }
}

/// Depth-first flattening encoder
///
/// Lines are appended in document order; container lines are left without a
/// payload until [`FlatEncoder::finish`] runs the backward annotation pass.
pub struct FlatEncoder {
    limits: Limits,
    lines: Vec<String>,
    /// Depth of every line in `lines`, kept to avoid re-counting markers
    depths: Vec<usize>,
    containers: Vec<PendingContainer>,
}

impl FlatEncoder {
    /// Create new encoder
    pub fn new(limits: Limits) -> Self {
        Self {
            limits,
            lines: Vec::new(),
            depths: Vec::new(),
            containers: Vec::new(),
        }
    }

    /// Flatten `root` and annotate jump counts.
    pub fn encode(mut self, root: &Value) -> Result<EncodedDocument> {
        let kind = match root {
            Value::Object(_) => ContainerKind::Object,
            Value::Array(_) => ContainerKind::Array,
            other => return Err(FlatError::UnsupportedRoot(other.type_name())),
        };
        self.flatten(root, 1)?;
        self.finish(kind)
    }

    fn flatten(&mut self, value: &Value, depth: usize) -> Result<()> {
        self.limits.check_depth(depth)?;
        match value {
            Value::Object(map) => {
                // Canonical order is the byte order of the encoded key token.
                let mut entries: Vec<(String, &Value)> = map
                    .iter()
                    .map(|(key, child)| (name_token(key), child))
                    .collect();
                entries.sort_by(|a, b| a.0.cmp(&b.0));
                for (token, child) in entries {
                    self.push_child(depth, &token, child)?;
                }
            }
            Value::Array(items) => {
                for (idx, child) in items.iter().enumerate() {
                    self.push_child(depth, &index_token(idx), child)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn push_child(&mut self, depth: usize, key_token: &str, child: &Value) -> Result<()> {
        let line_idx = self.lines.len();
        let mut line = String::new();
        write_line_head(&mut line, depth, key_token);
        self.lines.push(line);
        self.depths.push(depth);

        match child {
            Value::Object(_) | Value::Array(_) => {
                self.containers.push(PendingContainer {
                    line: line_idx,
                    depth,
                    kind: ContainerKind::from_is_array(matches!(child, Value::Array(_))),
                });
                self.flatten(child, depth + 1)
            }
            scalar => {
                push_inline(&mut self.lines[line_idx], &scalar_json(scalar));
                Ok(())
            }
        }
    }

    /// Backward pass: deepest/last containers first, so a parent reuses the
    /// span of each already-annotated child instead of rescanning it.
    fn finish(mut self, root: ContainerKind) -> Result<EncodedDocument> {
        self.limits.check_lines(self.lines.len())?;

        let mut spans: Vec<Option<usize>> = vec![None; self.lines.len()];
        for pending in self.containers.iter().rev() {
            let mut count = 0usize;
            let mut next = pending.line + 1;
            while next < self.lines.len() && self.depths[next] > pending.depth {
                let step = match spans[next] {
                    Some(span) => 1 + span,
                    None => 1,
                };
                count += step;
                next += step;
            }

            let line = &mut self.lines[pending.line];
            if count > 0 {
                spans[pending.line] = Some(count);
                push_jump(line, count);
            } else {
                push_inline(line, pending.kind.empty_literal());
            }
        }

        debug!(
            lines = self.lines.len(),
            containers = self.containers.len(),
            root = %root,
            "encoded flat index body"
        );

        Ok(EncodedDocument {
            lines: self.lines,
            root,
            container_count: self.containers.len(),
        })
    }
}

/// Compact JSON text of a scalar.
fn scalar_json(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        // Non-finite floats have no JSON form and become null.
        Value::Float(f) => serde_json::Value::from(*f).to_string(),
        Value::String(s) => name_token(s),
        container => container.to_json_string(),
    }
}

/// Encode a parsed value with default limits.
pub fn encode_value(root: &Value) -> Result<EncodedDocument> {
    FlatEncoder::new(Limits::default()).encode(root)
}

/// Parse JSON text and encode it.
pub fn encode_json_str(json: &str, limits: &Limits) -> Result<EncodedDocument> {
    let root = Value::from_json_str(json)?;
    FlatEncoder::new(limits.clone()).encode(&root)
}
