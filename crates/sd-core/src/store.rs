//! Durable project storage on top of a key-value backend.
//!
//! Records are JSON (`Project::to_json`) stored under keys namespaced by
//! database name and version, e.g. `StageDesignerDB/v1/project/<id>`.
//! Saving is an upsert: the first save mints the project id, later saves
//! overwrite the same key.
//!
//! Backends report failures instead of panicking. A failed write leaves the
//! caller's in-memory `Project` exactly as it was, so work is never lost to
//! an unavailable store.

use crate::id::Id;
use crate::project::Project;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage quota exceeded while writing {0}")]
    QuotaExceeded(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Project not found: {0}")]
    NotFound(Id),
}

// ─── Backends ────────────────────────────────────────────────────────────

/// Minimal string key-value store a project store can sit on.
pub trait KeyValueBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Returns whether the key existed.
    fn delete(&mut self, key: &str) -> Result<bool, StoreError>;
    /// All keys starting with `prefix`.
    fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}

/// In-process backend. Keys iterate in sorted order.
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    entries: BTreeMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.remove(key).is_some())
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .entries
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

/// One JSON file per key inside a directory. Native targets only.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct DirectoryBackend {
    root: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl DirectoryBackend {
    /// Open (creating if needed) a backend rooted at `root`.
    pub fn open(root: impl Into<std::path::PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    // '/' separates key segments; it cannot appear in a file name.
    fn path_for(&self, key: &str) -> std::path::PathBuf {
        self.root.join(format!("{}.json", key.replace('/', "~")))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueBackend for DirectoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        // write-then-rename so a crash never leaves a half-written record
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<bool, StoreError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let name = entry?.file_name();
            let Some(stem) = name.to_str().and_then(|n| n.strip_suffix(".json")) else {
                continue;
            };
            let key = stem.replace('~', "/");
            if key.starts_with(prefix) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }
}

// ─── Clock ───────────────────────────────────────────────────────────────

/// Source of wall-clock time in milliseconds since the Unix epoch.
pub trait Clock {
    fn now_ms(&self) -> i64;
}

/// `SystemTime`-backed clock. Not available on `wasm32-unknown-unknown`,
/// where the host supplies its own clock.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[cfg(not(target_arch = "wasm32"))]
impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }
}

/// Manually advanced clock. Clones share the same time.
#[derive(Debug, Default, Clone)]
pub struct ManualClock(Rc<Cell<i64>>);

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self(Rc::new(Cell::new(start_ms)))
    }

    pub fn set(&self, ms: i64) {
        self.0.set(ms);
    }

    pub fn advance(&self, ms: i64) {
        self.0.set(self.0.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.0.get()
    }
}

// ─── Project store ───────────────────────────────────────────────────────

/// Database name and schema version used to namespace keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
    pub db_name: String,
    pub version: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_name: "StageDesignerDB".to_string(),
            version: 1,
        }
    }
}

impl StoreConfig {
    fn prefix(&self) -> String {
        format!("{}/v{}/", self.db_name, self.version)
    }
}

/// Result of a successful manual save.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveReceipt {
    pub id: Id,
    pub timestamp: i64,
    /// Human-readable "last saved" time, e.g. `14:03:27`.
    pub label: String,
}

/// Format a save timestamp for display (UTC, `HH:MM:SS`).
pub fn last_saved_label(timestamp_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms)
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string())
}

pub struct ProjectStore<B: KeyValueBackend> {
    backend: B,
    config: StoreConfig,
    clock: Box<dyn Clock>,
}

impl<B: KeyValueBackend> ProjectStore<B> {
    pub fn new(backend: B, config: StoreConfig, clock: Box<dyn Clock>) -> Self {
        Self {
            backend,
            config,
            clock,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    fn project_prefix(&self) -> String {
        format!("{}project/", self.config.prefix())
    }

    fn project_key(&self, id: Id) -> String {
        format!("{}{}", self.project_prefix(), id.as_str())
    }

    fn slot_key(&self) -> String {
        format!("{}slot", self.config.prefix())
    }

    /// Upsert `project`. Mints an id on first save and stamps the
    /// timestamp; both are written back only if the backend accepts the
    /// record.
    pub fn save(&mut self, project: &mut Project) -> Result<SaveReceipt, StoreError> {
        let id = project.id.unwrap_or_else(|| Id::fresh("project"));
        let timestamp = self.clock.now_ms();

        let mut record = project.clone();
        record.id = Some(id);
        record.timestamp = timestamp;
        self.backend.put(&self.project_key(id), &record.to_json()?)?;

        project.id = Some(id);
        project.timestamp = timestamp;
        log::debug!("saved project {id} ({} items)", project.items.len());
        Ok(SaveReceipt {
            id,
            timestamp,
            label: last_saved_label(timestamp),
        })
    }

    /// All stored projects, newest first. Unreadable records are skipped.
    pub fn load_all(&self) -> Result<Vec<Project>, StoreError> {
        let mut projects = Vec::new();
        for key in self.backend.keys(&self.project_prefix())? {
            let Some(json) = self.backend.get(&key)? else {
                continue;
            };
            match Project::from_json(&json) {
                Ok(p) => projects.push(p),
                Err(e) => log::warn!("skipping unreadable project record {key}: {e}"),
            }
        }
        projects.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(projects)
    }

    pub fn load(&self, id: Id) -> Result<Project, StoreError> {
        let json = self
            .backend
            .get(&self.project_key(id))?
            .ok_or(StoreError::NotFound(id))?;
        Ok(Project::from_json(&json)?)
    }

    pub fn delete(&mut self, id: Id) -> Result<(), StoreError> {
        if !self.backend.delete(&self.project_key(id))? {
            log::debug!("delete: project {id} was not stored");
        }
        Ok(())
    }

    /// Store a copy of `project` under a new id with a suffixed name.
    pub fn duplicate(&mut self, project: &Project) -> Result<Project, StoreError> {
        let base = if project.project_name.is_empty() {
            "Untitled"
        } else {
            project.project_name.as_str()
        };
        let mut copy = project.clone();
        copy.id = None;
        copy.project_name = format!("{base} (Copy)");
        self.save(&mut copy)?;
        Ok(copy)
    }

    /// Single-slot quick save, independent of the project list.
    pub fn save_slot(&mut self, project: &Project) -> Result<(), StoreError> {
        let key = self.slot_key();
        self.backend.put(&key, &project.to_json()?)
    }

    pub fn load_slot(&self) -> Result<Option<Project>, StoreError> {
        match self.backend.get(&self.slot_key())? {
            Some(json) => Ok(Some(Project::from_json(&json)?)),
            None => Ok(None),
        }
    }
}

// ─── Autosave ────────────────────────────────────────────────────────────

/// Interval timer deciding when a silent save should run.
#[derive(Debug, Clone)]
pub struct Autosave {
    pub interval_ms: u64,
    last_tick_ms: Option<i64>,
}

impl Autosave {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_tick_ms: None,
        }
    }

    /// Advance the timer to `now_ms`. Returns `true` when an interval has
    /// elapsed and there is something to save. The first call only starts
    /// the timer.
    pub fn is_due(&mut self, now_ms: i64, project_is_empty: bool) -> bool {
        let Some(last) = self.last_tick_ms else {
            self.last_tick_ms = Some(now_ms);
            return false;
        };
        if now_ms.saturating_sub(last) < self.interval_ms as i64 {
            return false;
        }
        self.last_tick_ms = Some(now_ms);
        !project_is_empty
    }
}
