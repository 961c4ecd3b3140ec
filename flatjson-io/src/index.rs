//! Lock-guarded flat index instance
//!
//! A [`FlatIndex`] owns at most one open document plus its query caches.
//! Every public operation takes the instance lock for its whole duration, so
//! builds, opens and queries on one instance never interleave. Separate
//! instances share nothing.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use flatjson_codec::Resolver;
use flatjson_format::{
    ContainerKind, Envelope, FileHeader, FlatError, Key, KeyPath, Result, Value,
};
use tracing::{debug, warn};

use crate::cache::{CacheFlags, CacheKind, MemoTable, QueryCaches};
use crate::{BuildOptions, BuildSummary, IndexOptions, OpenOptions};

#[derive(Debug, Default)]
struct IndexState {
    data: Option<Envelope>,
    opened_file: Option<PathBuf>,
    caches: QueryCaches,
    flags: CacheFlags,
}

impl IndexState {
    fn unload(&mut self) {
        self.data = None;
        self.opened_file = None;
        self.caches.clear_all();
    }

    fn load(&mut self, envelope: Envelope, opened_file: Option<PathBuf>) {
        self.data = Some(envelope);
        self.opened_file = opened_file;
    }

    fn ensure_loaded(&self) -> Result<()> {
        match self.data {
            Some(_) => Ok(()),
            None => Err(FlatError::NoDataOpen),
        }
    }

    /// Answer one query, consulting and filling the table of `kind` under `key` when enabled.
    fn memoized<T, F>(
        &mut self,
        kind: CacheKind,
        key: String,
        table: fn(&mut QueryCaches) -> &mut MemoTable<T>,
        compute: F,
    ) -> Result<T>
    where
        T: Clone,
        F: FnOnce(&Resolver<'_>) -> Result<T>,
    {
        let envelope = self.data.as_ref().ok_or(FlatError::NoDataOpen)?;
        let enabled = self.flags.contains(kind);

        if enabled {
            if let Some(hit) = table(&mut self.caches).get(&key) {
                return Ok(hit);
            }
        }

        let result = compute(&Resolver::new(&envelope.lines, envelope.root()))?;
        if enabled {
            table(&mut self.caches).insert(key, result.clone());
        }
        Ok(result)
    }
}

/// Cache key of a raw path; unparsable paths are kept verbatim.
fn cache_key(path: &str) -> String {
    KeyPath::parse(path)
        .map(|p| p.normalized())
        .unwrap_or_else(|_| path.to_string())
}

/// One open flat index with its query caches
#[derive(Debug)]
pub struct FlatIndex {
    options: IndexOptions,
    state: Mutex<IndexState>,
}

impl Default for FlatIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl FlatIndex {
    /// Create an empty instance with default options (SHA-256, all caches on).
    pub fn new() -> Self {
        Self::with_options(IndexOptions::default())
    }

    /// Create an empty instance with custom options.
    pub fn with_options(options: IndexOptions) -> Self {
        let state = IndexState {
            flags: options.cache_flags,
            ..IndexState::default()
        };
        Self {
            options,
            state: Mutex::new(state),
        }
    }

    /// Options this instance was created with.
    pub fn options(&self) -> &IndexOptions {
        &self.options
    }

    fn lock(&self) -> MutexGuard<'_, IndexState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!("flat index lock poisoned by a panicking thread, recovering");
            poisoned.into_inner()
        })
    }

    fn build_options(&self) -> &BuildOptions {
        &self.options.build
    }

    fn open_options(&self, ignore_hash: bool) -> OpenOptions {
        self.options.open.ignoring_hash(ignore_hash)
    }

    // Building

    /// Encode JSON text and return the flat index text.
    ///
    /// Building never touches the open document.
    pub fn build_from_string(&self, json: &str) -> Result<String> {
        let _state = self.lock();
        crate::build_string(json, self.build_options())
    }

    /// Encode a JSON file and return the flat index text.
    pub fn build_from_file(&self, path: impl AsRef<Path>) -> Result<String> {
        let _state = self.lock();
        crate::build_file(path.as_ref(), self.build_options())
    }

    /// Encode a JSON file and write the flat index to `out_path`.
    pub fn build_from_file_to(
        &self,
        path: impl AsRef<Path>,
        out_path: impl AsRef<Path>,
    ) -> Result<BuildSummary> {
        let _state = self.lock();
        crate::build_file_to(path.as_ref(), out_path.as_ref(), self.build_options())
    }

    // Opening

    /// Open the flat index file at `path`, replacing any open document.
    ///
    /// On failure the instance is left with no document loaded.
    pub fn open_file(&self, path: impl AsRef<Path>, ignore_hash: bool) -> Result<()> {
        let path = path.as_ref().to_path_buf();
        let mut state = self.lock();
        self.open_path_locked(&mut state, path, ignore_hash)
    }

    /// Open flat index text held in memory.
    pub fn open_from_string(&self, text: &str, ignore_hash: bool) -> Result<()> {
        let mut state = self.lock();
        state.unload();
        let envelope = crate::open_string(text, &self.open_options(ignore_hash))?;
        state.load(envelope, None);
        Ok(())
    }

    /// Open flat index text already split into lines.
    pub fn open_from_array<I, S>(&self, lines: I, ignore_hash: bool) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        let mut state = self.lock();
        state.unload();
        let envelope = crate::open_lines(lines, &self.open_options(ignore_hash))?;
        state.load(envelope, None);
        Ok(())
    }

    /// Re-read the file last opened with [`FlatIndex::open_file`].
    pub fn reload_file(&self, ignore_hash: bool) -> Result<()> {
        let mut state = self.lock();
        let path = state.opened_file.clone().ok_or(FlatError::NoFileOpen)?;
        self.open_path_locked(&mut state, path, ignore_hash)
    }

    fn open_path_locked(
        &self,
        state: &mut IndexState,
        path: PathBuf,
        ignore_hash: bool,
    ) -> Result<()> {
        state.unload();
        let text = fs::read_to_string(&path)?;
        let envelope = crate::open_string(&text, &self.open_options(ignore_hash))?;
        debug!(path = %path.display(), "loaded flat index file");
        state.load(envelope, Some(path));
        Ok(())
    }

    // Queries

    /// Value at `path`, or `default` when the path cannot be resolved.
    ///
    /// An explicit JSON `null` in the document is returned as [`Value::Null`],
    /// not replaced by `default`.
    pub fn get_value(&self, path: &str, default: Value) -> Value {
        match self.try_get_value(path) {
            Ok(value) => value,
            Err(err) => {
                debug!(path, error = %err, "get_value fell back to default");
                default
            }
        }
    }

    /// Value at `path`, or the error that prevented resolving it.
    pub fn try_get_value(&self, path: &str) -> Result<Value> {
        let mut state = self.lock();
        state.ensure_loaded()?;
        let path = KeyPath::parse(path)?;
        state.memoized(CacheKind::Value, path.normalized(), QueryCaches::values_mut, |r| {
            r.value(&path)
        })
    }

    /// True when every segment of `path` resolves in the open document.
    pub fn has_path(&self, path: &str) -> bool {
        let parsed = KeyPath::parse(path);
        let key = match &parsed {
            Ok(parsed) => parsed.normalized(),
            Err(_) => path.to_string(),
        };
        let mut state = self.lock();
        state
            .memoized(CacheKind::HasPath, key, QueryCaches::has_path_mut, |r| {
                Ok(parsed.as_ref().is_ok_and(|p| r.exists(p)))
            })
            .unwrap_or(false)
    }

    /// Number of direct children of the container at `path`.
    pub fn get_size(&self, path: &str) -> Result<usize> {
        let mut state = self.lock();
        state.ensure_loaded()?;
        let path = KeyPath::parse(path)?;
        state.memoized(CacheKind::Size, path.normalized(), QueryCaches::sizes_mut, |r| {
            let slice = r.container_slice(&path)?;
            r.size(&slice)
        })
    }

    /// Keys of the direct children of the container at `path`.
    pub fn get_keys(&self, path: &str) -> Result<Vec<Key>> {
        let mut state = self.lock();
        state.ensure_loaded()?;
        let path = KeyPath::parse(path)?;
        state.memoized(CacheKind::Keys, path.normalized(), QueryCaches::keys_mut, |r| {
            let slice = r.container_slice(&path)?;
            r.keys(&slice)
        })
    }

    /// Every path below the container at `path`, in document order.
    pub fn get_sub_paths(&self, path: &str) -> Result<Vec<String>> {
        let mut state = self.lock();
        state.ensure_loaded()?;
        let path = KeyPath::parse(path)?;
        state.memoized(CacheKind::SubPaths, path.normalized(), QueryCaches::sub_paths_mut, |r| {
            let slice = r.container_slice(&path)?;
            r.sub_paths(&path, &slice)
        })
    }

    // State

    /// Drop the open document and every cache entry, and restore the
    /// configured cache flags.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.unload();
        state.flags = self.options.cache_flags;
        debug!("flat index cleared");
    }

    /// Drop the open document and every cache entry.
    pub fn close(&self) {
        self.lock().unload();
        debug!("flat index closed");
    }

    /// True when a document is open.
    pub fn is_data_loaded(&self) -> bool {
        self.lock().data.is_some()
    }

    /// File the open document was read from, if any.
    pub fn opened_file(&self) -> Option<PathBuf> {
        self.lock().opened_file.clone()
    }

    /// Header of the open document.
    pub fn header(&self) -> Option<FileHeader> {
        self.lock().data.as_ref().map(|d| d.header.clone())
    }

    /// Root container kind of the open document.
    pub fn root_kind(&self) -> Option<ContainerKind> {
        self.lock().data.as_ref().map(Envelope::root)
    }

    /// Body line count of the open document.
    pub fn line_count(&self) -> Option<usize> {
        self.lock().data.as_ref().map(|d| d.lines.len())
    }

    /// Format version this build writes and accepts.
    pub fn get_format_version(&self) -> &'static str {
        crate::format_version()
    }

    // Cache controls

    /// Empty every cache table.
    pub fn clear_caches(&self) {
        self.lock().caches.clear_all();
        debug!("cleared all query caches");
    }

    /// Empty the table of `kind`.
    pub fn clear_cache(&self, kind: CacheKind) {
        self.lock().caches.clear(kind);
        debug!(cache = %kind, "cleared query cache");
    }

    /// Evict the entry for `path` from the table of `kind`.
    pub fn remove_from_cache(&self, kind: CacheKind, path: &str) -> bool {
        self.lock().caches.remove(kind, &cache_key(path))
    }

    /// True when the table of `kind` holds an entry for `path`.
    pub fn has_in_cache(&self, kind: CacheKind, path: &str) -> bool {
        self.lock().caches.contains(kind, &cache_key(path))
    }

    /// Enable or disable the table of `kind`.
    pub fn set_cache_enabled(&self, kind: CacheKind, enabled: bool) {
        self.lock().flags.set(kind, enabled);
    }

    /// True when the table of `kind` is consulted by queries.
    pub fn is_cache_enabled(&self, kind: CacheKind) -> bool {
        self.lock().flags.contains(kind)
    }

    /// Enabled cache tables.
    pub fn cache_flags(&self) -> CacheFlags {
        self.lock().flags
    }

    /// Replace the enabled cache tables.
    pub fn set_cache_flags(&self, flags: CacheFlags) {
        self.lock().flags = flags;
    }
}
