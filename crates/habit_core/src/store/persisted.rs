//! Shared load/install/save cell behind every store.
//!
//! # Invariants
//! - `loaded` flips on the first `load()` call, whatever its outcome.
//! - Writes run `load()` first when it has not run yet.
//! - `install()` replaces the whole value in one assignment before saving.
//! - `last_failure` always describes the most recent load or save attempt.

use super::{LoadOutcome, SaveStatus};
use crate::storage::{KvBackend, StorageError, StorageResult};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::rc::Rc;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Text encoding of one store's state.
pub(crate) struct Codec<T> {
    pub(crate) encode: fn(&T) -> StorageResult<String>,
    pub(crate) decode: fn(&str) -> StorageResult<T>,
}

impl<T: Serialize + DeserializeOwned> Codec<T> {
    pub(crate) fn json() -> Self {
        Self {
            encode: encode_json::<T>,
            decode: decode_json::<T>,
        }
    }
}

pub(crate) fn encode_json<T: Serialize>(value: &T) -> StorageResult<String> {
    serde_json::to_string(value).map_err(StorageError::Encode)
}

pub(crate) fn decode_json<T: DeserializeOwned>(raw: &str) -> StorageResult<T> {
    serde_json::from_str(raw).map_err(StorageError::Decode)
}

type Observer<T> = Box<dyn FnMut(&T)>;

struct Observers<T> {
    next_id: u64,
    entries: Vec<(SubscriptionId, Observer<T>)>,
}

impl<T> Observers<T> {
    fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    fn add(&mut self, observer: Observer<T>) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.entries.push((id, observer));
        id
    }

    fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(existing, _)| *existing != id);
        self.entries.len() != before
    }

    fn notify(&mut self, value: &T) {
        for (_, observer) in &mut self.entries {
            observer(value);
        }
    }
}

pub(crate) struct PersistedCell<T> {
    key: &'static str,
    backend: Rc<dyn KvBackend>,
    codec: Codec<T>,
    value: T,
    loaded: bool,
    last_failure: Option<StorageError>,
    observers: Observers<T>,
}

impl<T: Default> PersistedCell<T> {
    pub(crate) fn new(key: &'static str, backend: Rc<dyn KvBackend>, codec: Codec<T>) -> Self {
        Self {
            key,
            backend,
            codec,
            value: T::default(),
            loaded: false,
            last_failure: None,
            observers: Observers::new(),
        }
    }

    pub(crate) fn get(&self) -> &T {
        &self.value
    }

    pub(crate) fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub(crate) fn last_failure(&self) -> Option<&StorageError> {
        self.last_failure.as_ref()
    }

    fn ensure_loaded(&mut self) {
        if !self.loaded {
            self.load();
        }
    }

    pub(crate) fn load(&mut self) -> LoadOutcome {
        if self.loaded {
            return LoadOutcome::AlreadyLoaded;
        }
        self.loaded = true;

        if !self.backend.is_available() {
            info!(
                "event=store_load module=store status=skipped key={} reason=backend_unavailable",
                self.key
            );
            self.last_failure = Some(StorageError::Unavailable);
            return LoadOutcome::Unavailable;
        }

        let read = self.backend.get(self.key).and_then(|raw| match raw {
            Some(raw) if !raw.is_empty() => (self.codec.decode)(&raw).map(Some),
            _ => Ok(None),
        });

        match read {
            Ok(Some(value)) => {
                self.value = value;
                self.last_failure = None;
                info!(
                    "event=store_load module=store status=ok key={} outcome=loaded",
                    self.key
                );
                self.observers.notify(&self.value);
                LoadOutcome::Loaded
            }
            Ok(None) => {
                self.last_failure = None;
                info!(
                    "event=store_load module=store status=ok key={} outcome=empty",
                    self.key
                );
                LoadOutcome::Empty
            }
            Err(err) => {
                warn!(
                    "event=store_load module=store status=error key={} outcome=recovered error={err}",
                    self.key
                );
                self.value = T::default();
                self.last_failure = Some(err);
                self.observers.notify(&self.value);
                LoadOutcome::Recovered
            }
        }
    }

    /// Builds the next state from the loaded current one and installs it.
    ///
    /// Runs `load()` first when it has not run yet, so stored records are
    /// never replaced by a state derived from the empty default. `build`
    /// returning `None` skips the install entirely.
    pub(crate) fn modify(&mut self, build: impl FnOnce(&T) -> Option<T>) -> SaveStatus {
        self.ensure_loaded();
        match build(&self.value) {
            Some(next) => self.install(next),
            None => SaveStatus::Skipped,
        }
    }

    /// Installs `next` as the current state, saves it and notifies.
    pub(crate) fn install(&mut self, next: T) -> SaveStatus {
        self.ensure_loaded();
        self.value = next;
        let status = self.save();
        self.observers.notify(&self.value);
        status
    }

    pub(crate) fn save(&mut self) -> SaveStatus {
        self.ensure_loaded();
        if !self.backend.is_available() {
            debug!(
                "event=store_save module=store status=skipped key={} reason=backend_unavailable",
                self.key
            );
            self.last_failure = Some(StorageError::Unavailable);
            return SaveStatus::Unavailable;
        }

        let written = (self.codec.encode)(&self.value)
            .and_then(|text| self.backend.set(self.key, &text));

        match written {
            Ok(()) => {
                debug!("event=store_save module=store status=ok key={}", self.key);
                self.last_failure = None;
                SaveStatus::Saved
            }
            Err(err) => {
                warn!(
                    "event=store_save module=store status=error key={} error={err}",
                    self.key
                );
                self.last_failure = Some(err);
                SaveStatus::Failed
            }
        }
    }

    /// Resets to the default value and removes the key from the backend.
    pub(crate) fn clear(&mut self) -> SaveStatus {
        self.loaded = true;
        self.value = T::default();

        let status = if !self.backend.is_available() {
            self.last_failure = Some(StorageError::Unavailable);
            SaveStatus::Unavailable
        } else {
            match self.backend.remove(self.key) {
                Ok(()) => {
                    info!("event=store_clear module=store status=ok key={}", self.key);
                    self.last_failure = None;
                    SaveStatus::Saved
                }
                Err(err) => {
                    warn!(
                        "event=store_clear module=store status=error key={} error={err}",
                        self.key
                    );
                    self.last_failure = Some(err);
                    SaveStatus::Failed
                }
            }
        };

        self.observers.notify(&self.value);
        status
    }

    pub(crate) fn subscribe(&mut self, observer: impl FnMut(&T) + 'static) -> SubscriptionId {
        self.observers.add(Box::new(observer))
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::{Codec, PersistedCell};
    use crate::storage::{KvBackend, MemoryBackend, StorageError};
    use crate::store::{LoadOutcome, SaveStatus};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn cell(backend: &Rc<MemoryBackend>) -> PersistedCell<Vec<u32>> {
        let backend: Rc<dyn KvBackend> = backend.clone();
        PersistedCell::new("numbers", backend, Codec::json())
    }

    #[test]
    fn load_is_one_shot() {
        let backend = Rc::new(MemoryBackend::new());
        backend.seed("numbers", "[1,2]");
        let mut cell = cell(&backend);

        assert_eq!(cell.load(), LoadOutcome::Loaded);
        backend.seed("numbers", "[3]");
        assert_eq!(cell.load(), LoadOutcome::AlreadyLoaded);
        assert_eq!(cell.get(), &vec![1, 2]);
    }

    #[test]
    fn empty_stored_text_is_treated_as_missing() {
        let backend = Rc::new(MemoryBackend::new());
        backend.seed("numbers", "");
        let mut cell = cell(&backend);

        assert_eq!(cell.load(), LoadOutcome::Empty);
        assert!(cell.last_failure().is_none());
    }

    #[test]
    fn unavailable_backend_still_marks_loaded() {
        let backend = Rc::new(MemoryBackend::unavailable());
        let mut cell = cell(&backend);

        assert_eq!(cell.load(), LoadOutcome::Unavailable);
        assert!(cell.is_loaded());
        backend.set_available(true);
        assert_eq!(cell.load(), LoadOutcome::AlreadyLoaded);
    }

    #[test]
    fn install_notifies_even_when_save_fails() {
        let backend = Rc::new(MemoryBackend::with_quota(4));
        let mut cell = cell(&backend);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        cell.subscribe(move |value: &Vec<u32>| sink.borrow_mut().push(value.clone()));

        assert_eq!(cell.install(vec![1, 2, 3]), SaveStatus::Failed);
        assert_eq!(cell.get(), &vec![1, 2, 3]);
        assert!(matches!(
            cell.last_failure(),
            Some(StorageError::QuotaExceeded { .. })
        ));
        assert_eq!(seen.borrow().as_slice(), &[vec![1, 2, 3]]);
    }

    #[test]
    fn first_write_without_load_keeps_stored_state() {
        let backend = Rc::new(MemoryBackend::new());
        backend.seed("numbers", "[1,2]");
        let mut cell = cell(&backend);

        let status = cell.modify(|current| {
            let mut next = current.clone();
            next.push(3);
            Some(next)
        });

        assert_eq!(status, SaveStatus::Saved);
        assert!(cell.is_loaded());
        assert_eq!(backend.snapshot()["numbers"], "[1,2,3]");
        assert_eq!(cell.load(), LoadOutcome::AlreadyLoaded);
    }

    #[test]
    fn modify_returning_none_skips_save() {
        let backend = Rc::new(MemoryBackend::new());
        let mut cell = cell(&backend);

        assert_eq!(cell.modify(|_| None), SaveStatus::Skipped);
        assert!(backend.snapshot().is_empty());
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let backend = Rc::new(MemoryBackend::new());
        let mut cell = cell(&backend);
        let count = Rc::new(RefCell::new(0));
        let sink = count.clone();
        let id = cell.subscribe(move |_: &Vec<u32>| *sink.borrow_mut() += 1);

        cell.install(vec![1]);
        assert!(cell.unsubscribe(id));
        assert!(!cell.unsubscribe(id));
        cell.install(vec![2]);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn clear_removes_key_and_resets_value() {
        let backend = Rc::new(MemoryBackend::new());
        let mut cell = cell(&backend);
        cell.install(vec![7]);
        assert!(backend.snapshot().contains_key("numbers"));

        assert_eq!(cell.clear(), SaveStatus::Saved);
        assert!(cell.get().is_empty());
        assert!(!backend.snapshot().contains_key("numbers"));
    }
}
