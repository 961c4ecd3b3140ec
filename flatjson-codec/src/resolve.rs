//! Path resolution over flat index lines
//!
//! Resolution never builds intermediate containers. Each segment is looked up
//! among the direct children of the current range, leaping over sibling
//! subtrees by their jump counts, and a match narrows the range to the
//! matched container's subtree.

use std::ops::Range;

use flatjson_format::line::{depth_of, index_token, matches_head, name_token, search_pattern};
use flatjson_format::path::{join_segments, parse_index_segment};
use flatjson_format::{ContainerKind, FlatError, Key, KeyPath, LineRef, Payload, Result, Value};
use smallvec::SmallVec;

use crate::materialize::{range_kind, Materializer};

/// Lines holding the direct children of one addressed container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerSlice {
    /// First line of the subtree
    pub start: usize,
    /// One past the last line of the subtree
    pub end: usize,
    /// Depth of the direct children
    pub child_depth: usize,
    /// Kind of the addressed container
    pub kind: ContainerKind,
}

impl ContainerSlice {
    /// Number of lines in the whole subtree.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True for an empty container.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Where a path landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Root,
    Line(usize),
}

/// Path resolver over the body lines of one open index
pub struct Resolver<'a> {
    lines: &'a [String],
    root: ContainerKind,
}

impl<'a> Resolver<'a> {
    /// Create a resolver over `lines`, whose root container is `root`.
    pub fn new(lines: &'a [String], root: ContainerKind) -> Self {
        Self { lines, root }
    }

    /// Resolve `path` and rebuild the value it names.
    pub fn value(&self, path: &KeyPath) -> Result<Value> {
        let materializer = Materializer::new(self.lines);
        match self.locate(path)? {
            Target::Root => materializer.container(0, self.lines.len(), 1, self.root),
            Target::Line(idx) => materializer.line_value(idx),
        }
    }

    /// True when every segment of `path` resolves.
    pub fn exists(&self, path: &KeyPath) -> bool {
        self.locate(path).is_ok()
    }

    /// Resolve `path` to the slice holding its children.
    ///
    /// An inline empty container yields an empty slice; a scalar is an error.
    pub fn container_slice(&self, path: &KeyPath) -> Result<ContainerSlice> {
        match self.locate(path)? {
            Target::Root => Ok(ContainerSlice {
                start: 0,
                end: self.lines.len(),
                child_depth: 1,
                kind: self.root,
            }),
            Target::Line(idx) => {
                let line = self.parse_line(idx)?;
                let child_depth = line.depth + 1;
                match line.payload {
                    Payload::Jump(count) => {
                        let range = self.subtree(idx, count, self.lines.len())?;
                        Ok(ContainerSlice {
                            start: range.start,
                            end: range.end,
                            child_depth,
                            kind: range_kind(self.lines, range.start, range.end),
                        })
                    }
                    Payload::Inline(text) if line.payload.is_empty_container() => {
                        Ok(ContainerSlice {
                            start: idx + 1,
                            end: idx + 1,
                            child_depth,
                            kind: ContainerKind::from_is_array(text.starts_with('[')),
                        })
                    }
                    Payload::Inline(_) => Err(FlatError::invalid_path(
                        path.normalized(),
                        "path resolves to a value, not a container",
                    )),
                }
            }
        }
    }

    /// Number of direct children in `slice`.
    pub fn size(&self, slice: &ContainerSlice) -> Result<usize> {
        let mut count = 0;
        self.for_each_child(slice, |_, _| {
            count += 1;
            Ok(())
        })?;
        Ok(count)
    }

    /// Decoded keys of the direct children in `slice`, in line order.
    pub fn keys(&self, slice: &ContainerSlice) -> Result<Vec<Key>> {
        let mut keys = Vec::new();
        self.for_each_child(slice, |idx, line| {
            keys.push(line.key(idx)?);
            Ok(())
        })?;
        Ok(keys)
    }

    /// Escaped paths of every line in `slice`, prefixed by `base`.
    pub fn sub_paths(&self, base: &KeyPath, slice: &ContainerSlice) -> Result<Vec<String>> {
        let base_len = base.len();
        let mut stack: SmallVec<[String; 8]> = base.segments().iter().cloned().collect();
        let mut paths = Vec::with_capacity(slice.len());

        for idx in slice.start..slice.end {
            let line = self.parse_line(idx)?;
            let relative = line.depth.checked_sub(slice.child_depth).ok_or_else(|| {
                FlatError::MalformedLine {
                    line: idx,
                    message: format!(
                        "depth {} is shallower than its container's children ({})",
                        line.depth, slice.child_depth
                    ),
                }
            })?;
            stack.truncate(base_len + relative);
            stack.push(line.key(idx)?.to_string());
            paths.push(join_segments(stack.iter().map(String::as_str)));
        }
        Ok(paths)
    }

    /// Visit the direct children of `slice`, leaping over their subtrees.
    fn for_each_child<F>(&self, slice: &ContainerSlice, mut visit: F) -> Result<()>
    where
        F: FnMut(usize, &LineRef<'a>) -> Result<()>,
    {
        let mut idx = slice.start;
        while idx < slice.end {
            let line = self.parse_line(idx)?;
            if line.depth != slice.child_depth {
                return Err(FlatError::MalformedLine {
                    line: idx,
                    message: format!(
                        "expected depth {}, found {}",
                        slice.child_depth, line.depth
                    ),
                });
            }
            visit(idx, &line)?;
            idx = match line.jump() {
                Some(count) => self.subtree(idx, count, slice.end)?.end,
                None => idx + 1,
            };
        }
        Ok(())
    }

    fn locate(&self, path: &KeyPath) -> Result<Target> {
        let segments = path.segments();
        let mut range = 0..self.lines.len();
        let mut parent = self.root;

        for (i, segment) in segments.iter().enumerate() {
            let idx = self.find_segment(segment, i + 1, range.clone(), parent, path)?;
            if i + 1 == segments.len() {
                return Ok(Target::Line(idx));
            }

            let line = self.parse_line(idx)?;
            match line.payload {
                Payload::Jump(count) => {
                    range = self.subtree(idx, count, range.end)?;
                    parent = range_kind(self.lines, range.start, range.end);
                }
                Payload::Inline(_) if line.payload.is_empty_container() => {
                    return Err(FlatError::invalid_path(
                        path.normalized(),
                        format!(
                            "path part '{}' not found, '{}' is empty",
                            segments[i + 1],
                            segment
                        ),
                    ));
                }
                Payload::Inline(_) => {
                    return Err(FlatError::invalid_path(
                        path.normalized(),
                        format!(
                            "path expects a container, but found a value at part '{}'",
                            segment
                        ),
                    ));
                }
            }
        }
        Ok(Target::Root)
    }

    /// Find the child keyed by `segment` among the lines at `depth` in `range`.
    fn find_segment(
        &self,
        segment: &str,
        depth: usize,
        range: Range<usize>,
        parent: ContainerKind,
        path: &KeyPath,
    ) -> Result<usize> {
        let token = match parent {
            ContainerKind::Array => {
                let idx = parse_index_segment(segment).ok_or_else(|| {
                    FlatError::invalid_path(
                        path.normalized(),
                        format!(
                            "an array can only be indexed by a non-negative integer, got '{}'",
                            segment
                        ),
                    )
                })?;
                index_token(idx)
            }
            ContainerKind::Object => name_token(segment),
        };
        let pattern = search_pattern(depth, &token);

        let mut idx = range.start;
        while idx < range.end {
            let raw = &self.lines[idx];
            if matches_head(raw, &pattern) {
                return Ok(idx);
            }
            // Leap over this sibling's subtree.
            idx = match self.parse_line(idx)?.jump() {
                Some(count) if depth_of(raw) == depth => self.subtree(idx, count, range.end)?.end,
                _ => idx + 1,
            };
        }

        Err(FlatError::invalid_path(
            path.normalized(),
            format!("path part '{}' not found", segment),
        ))
    }

    /// Lines spanned by the container on line `idx`, bounded by `limit`.
    fn subtree(&self, idx: usize, count: usize, limit: usize) -> Result<Range<usize>> {
        let start = idx + 1;
        let end = start
            .checked_add(count)
            .filter(|end| *end <= limit)
            .ok_or(FlatError::CorruptJumpMarker { line: idx })?;
        Ok(start..end)
    }

    fn parse_line(&self, idx: usize) -> Result<LineRef<'a>> {
        LineRef::parse(&self.lines[idx], idx)
    }
}
