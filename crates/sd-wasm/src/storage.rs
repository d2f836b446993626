//! Browser storage and clock for the project store.
//!
//! Projects persist in `window.localStorage`. When it is unavailable
//! (private mode, sandboxed iframe) the session falls back to an in-memory
//! store and keeps working; saves then last only for the page lifetime.

use sd_core::store::{Clock, KeyValueBackend, MemoryBackend, StoreError};
use wasm_bindgen::JsValue;

fn js_error(e: JsValue) -> StoreError {
    StoreError::Unavailable(e.as_string().unwrap_or_else(|| format!("{e:?}")))
}

/// `localStorage`-backed key-value store.
pub struct LocalStorageBackend {
    storage: web_sys::Storage,
}

impl LocalStorageBackend {
    pub fn open() -> Result<Self, StoreError> {
        let window =
            web_sys::window().ok_or_else(|| StoreError::Unavailable("no window".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(js_error)?
            .ok_or_else(|| StoreError::Unavailable("localStorage is disabled".to_string()))?;
        Ok(Self { storage })
    }
}

impl KeyValueBackend for LocalStorageBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage.get_item(key).map_err(js_error)
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        // setItem only throws on quota exhaustion
        self.storage
            .set_item(key, value)
            .map_err(|_| StoreError::QuotaExceeded(key.to_string()))
    }

    fn delete(&mut self, key: &str) -> Result<bool, StoreError> {
        let existed = self.get(key)?.is_some();
        self.storage.remove_item(key).map_err(js_error)?;
        Ok(existed)
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let len = self.storage.length().map_err(js_error)?;
        let mut keys = Vec::new();
        for i in 0..len {
            if let Some(key) = self.storage.key(i).map_err(js_error)?
                && key.starts_with(prefix)
            {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}

/// Whichever backend the page could get.
pub enum BrowserBackend {
    Local(LocalStorageBackend),
    Memory(MemoryBackend),
}

impl BrowserBackend {
    /// `localStorage` if reachable, otherwise memory.
    pub fn detect() -> Self {
        match LocalStorageBackend::open() {
            Ok(local) => Self::Local(local),
            Err(e) => {
                log::warn!("{e}; projects will not outlive this page");
                Self::Memory(MemoryBackend::new())
            }
        }
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self, Self::Local(_))
    }
}

impl KeyValueBackend for BrowserBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self {
            Self::Local(b) => b.get(key),
            Self::Memory(b) => b.get(key),
        }
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        match self {
            Self::Local(b) => b.put(key, value),
            Self::Memory(b) => b.put(key, value),
        }
    }

    fn delete(&mut self, key: &str) -> Result<bool, StoreError> {
        match self {
            Self::Local(b) => b.delete(key),
            Self::Memory(b) => b.delete(key),
        }
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        match self {
            Self::Local(b) => b.keys(prefix),
            Self::Memory(b) => b.keys(prefix),
        }
    }
}

/// `Date.now()`.
pub struct JsClock;

impl Clock for JsClock {
    fn now_ms(&self) -> i64 {
        js_sys::Date::now() as i64
    }
}
