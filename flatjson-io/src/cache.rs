//! Per-query memoization tables
//!
//! Five independent tables, one per query kind, each keyed by the normalized
//! query path. Whether a table is consulted is decided by [`CacheFlags`].

use std::fmt;

use ahash::AHashMap;
use flatjson_format::constants::{
    CACHE_ALL, CACHE_HAS_PATH, CACHE_KEYS, CACHE_SIZE, CACHE_SUB_PATHS, CACHE_VALUE,
};
use flatjson_format::{Key, Value};

/// Query kind owning one cache table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKind {
    /// `get_value` results
    Value,
    /// `has_path` results
    HasPath,
    /// `get_size` results
    Size,
    /// `get_sub_paths` results
    SubPaths,
    /// `get_keys` results
    Keys,
}

impl CacheKind {
    /// Every kind, in flag order.
    pub const ALL: [CacheKind; 5] = [
        CacheKind::Value,
        CacheKind::HasPath,
        CacheKind::Size,
        CacheKind::SubPaths,
        CacheKind::Keys,
    ];

    /// Bit of this kind in a [`CacheFlags`] set.
    pub fn flag(self) -> u8 {
        match self {
            CacheKind::Value => CACHE_VALUE,
            CacheKind::HasPath => CACHE_HAS_PATH,
            CacheKind::Size => CACHE_SIZE,
            CacheKind::SubPaths => CACHE_SUB_PATHS,
            CacheKind::Keys => CACHE_KEYS,
        }
    }

    /// Lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            CacheKind::Value => "value",
            CacheKind::HasPath => "has-path",
            CacheKind::Size => "size",
            CacheKind::SubPaths => "sub-paths",
            CacheKind::Keys => "keys",
        }
    }
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of enabled cache tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheFlags(u8);

impl CacheFlags {
    /// No table enabled
    pub const NONE: CacheFlags = CacheFlags(0);
    /// Every table enabled
    pub const ALL: CacheFlags = CacheFlags(CACHE_ALL);

    /// Build from raw bits; unknown bits are dropped.
    pub fn from_bits(bits: u8) -> Self {
        CacheFlags(bits & CACHE_ALL)
    }

    /// Raw bits.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// True when `kind` is enabled.
    pub fn contains(self, kind: CacheKind) -> bool {
        self.0 & kind.flag() != 0
    }

    /// Enable or disable `kind`.
    pub fn set(&mut self, kind: CacheKind, enabled: bool) {
        if enabled {
            self.0 |= kind.flag();
        } else {
            self.0 &= !kind.flag();
        }
    }
}

impl Default for CacheFlags {
    fn default() -> Self {
        CacheFlags::ALL
    }
}

/// Memoization table keyed by normalized path
#[derive(Debug, Clone)]
pub struct MemoTable<T> {
    entries: AHashMap<String, T>,
}

impl<T> Default for MemoTable<T> {
    fn default() -> Self {
        Self {
            entries: AHashMap::new(),
        }
    }
}

impl<T: Clone> MemoTable<T> {
    /// Cached result for `path`, if any.
    pub fn get(&self, path: &str) -> Option<T> {
        self.entries.get(path).cloned()
    }

    /// Store `result` for `path`.
    pub fn insert(&mut self, path: String, result: T) {
        self.entries.insert(path, result);
    }

    /// Evict `path`; returns whether an entry was present.
    pub fn remove(&mut self, path: &str) -> bool {
        self.entries.remove(path).is_some()
    }

    /// True when `path` is memoized.
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the table holds nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The five query tables of one index instance
#[derive(Debug, Clone, Default)]
pub struct QueryCaches {
    values: MemoTable<Value>,
    has_path: MemoTable<bool>,
    sizes: MemoTable<usize>,
    sub_paths: MemoTable<Vec<String>>,
    keys: MemoTable<Vec<Key>>,
}

impl QueryCaches {
    /// Materialized values
    pub fn values_mut(&mut self) -> &mut MemoTable<Value> {
        &mut self.values
    }

    /// Path existence
    pub fn has_path_mut(&mut self) -> &mut MemoTable<bool> {
        &mut self.has_path
    }

    /// Direct child counts
    pub fn sizes_mut(&mut self) -> &mut MemoTable<usize> {
        &mut self.sizes
    }

    /// Recursive sub-path lists
    pub fn sub_paths_mut(&mut self) -> &mut MemoTable<Vec<String>> {
        &mut self.sub_paths
    }

    /// Direct child keys
    pub fn keys_mut(&mut self) -> &mut MemoTable<Vec<Key>> {
        &mut self.keys
    }

    /// Empty every table.
    pub fn clear_all(&mut self) {
        for kind in CacheKind::ALL {
            self.clear(kind);
        }
    }

    /// Empty the table of `kind`.
    pub fn clear(&mut self, kind: CacheKind) {
        match kind {
            CacheKind::Value => self.values.clear(),
            CacheKind::HasPath => self.has_path.clear(),
            CacheKind::Size => self.sizes.clear(),
            CacheKind::SubPaths => self.sub_paths.clear(),
            CacheKind::Keys => self.keys.clear(),
        }
    }

    /// Evict one entry from the table of `kind`.
    pub fn remove(&mut self, kind: CacheKind, path: &str) -> bool {
        match kind {
            CacheKind::Value => self.values.remove(path),
            CacheKind::HasPath => self.has_path.remove(path),
            CacheKind::Size => self.sizes.remove(path),
            CacheKind::SubPaths => self.sub_paths.remove(path),
            CacheKind::Keys => self.keys.remove(path),
        }
    }

    /// True when the table of `kind` holds `path`.
    pub fn contains(&self, kind: CacheKind, path: &str) -> bool {
        match kind {
            CacheKind::Value => self.values.contains(path),
            CacheKind::HasPath => self.has_path.contains(path),
            CacheKind::Size => self.sizes.contains(path),
            CacheKind::SubPaths => self.sub_paths.contains(path),
            CacheKind::Keys => self.keys.contains(path),
        }
    }

    /// Number of entries in the table of `kind`.
    pub fn len(&self, kind: CacheKind) -> usize {
        match kind {
            CacheKind::Value => self.values.len(),
            CacheKind::HasPath => self.has_path.len(),
            CacheKind::Size => self.sizes.len(),
            CacheKind::SubPaths => self.sub_paths.len(),
            CacheKind::Keys => self.keys.len(),
        }
    }
}
