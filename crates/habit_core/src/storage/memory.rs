//! In-process key-value backend.

use super::{entry_size, KvBackend, StorageError, StorageResult};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

/// Map-backed store mirroring browser local storage semantics.
///
/// Availability can be switched off to mimic a non-browser context, and an
/// optional byte quota mimics the browser's per-origin storage limit.
#[derive(Debug)]
pub struct MemoryBackend {
    entries: RefCell<BTreeMap<String, String>>,
    available: Cell<bool>,
    quota_bytes: Option<u64>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self {
            entries: RefCell::new(BTreeMap::new()),
            available: Cell::new(true),
            quota_bytes: None,
        }
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an available backend that rejects writes past `quota_bytes`.
    pub fn with_quota(quota_bytes: u64) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Self::default()
        }
    }

    /// Creates a backend that reports itself unavailable.
    pub fn unavailable() -> Self {
        let backend = Self::default();
        backend.set_available(false);
        backend
    }

    pub fn set_available(&self, available: bool) {
        self.available.set(available);
    }

    /// Returns a copy of every stored entry, ignoring availability.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries.borrow().clone()
    }

    /// Writes raw text directly, bypassing quota and availability.
    ///
    /// Used to seed legacy or corrupted payloads.
    pub fn seed(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.borrow_mut().insert(key.into(), value.into());
    }

    fn ensure_available(&self) -> StorageResult<()> {
        if self.available.get() {
            Ok(())
        } else {
            Err(StorageError::Unavailable)
        }
    }
}

impl KvBackend for MemoryBackend {
    fn is_available(&self) -> bool {
        self.available.get()
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.ensure_available()?;
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.ensure_available()?;

        if let Some(quota_bytes) = self.quota_bytes {
            let others: u64 = self
                .entries
                .borrow()
                .iter()
                .filter(|(existing, _)| existing.as_str() != key)
                .map(|(existing, text)| entry_size(existing, text))
                .sum();
            let required_bytes = others + entry_size(key, value);
            if required_bytes > quota_bytes {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    required_bytes,
                    quota_bytes,
                });
            }
        }

        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.ensure_available()?;
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryBackend;
    use crate::storage::{KvBackend, StorageError};

    #[test]
    fn set_get_remove_roundtrip() {
        let backend = MemoryBackend::new();
        backend.set("k", "v").unwrap();
        assert_eq!(backend.get("k").unwrap().as_deref(), Some("v"));
        backend.remove("k").unwrap();
        assert_eq!(backend.get("k").unwrap(), None);
    }

    #[test]
    fn unavailable_backend_rejects_every_call() {
        let backend = MemoryBackend::unavailable();
        assert!(!backend.is_available());
        assert!(matches!(backend.get("k"), Err(StorageError::Unavailable)));
        assert!(matches!(backend.set("k", "v"), Err(StorageError::Unavailable)));
        assert!(matches!(backend.remove("k"), Err(StorageError::Unavailable)));
    }

    #[test]
    fn quota_counts_other_entries_and_allows_shrinking_rewrites() {
        let backend = MemoryBackend::with_quota(10);
        backend.set("a", "1234").unwrap();

        let err = backend.set("b", "123456").unwrap_err();
        assert!(matches!(
            err,
            StorageError::QuotaExceeded {
                required_bytes: 12,
                quota_bytes: 10,
                ..
            }
        ));
        assert_eq!(backend.get("b").unwrap(), None);

        backend.set("a", "123456789").unwrap();
        assert_eq!(backend.get("a").unwrap().as_deref(), Some("123456789"));
    }
}
