//! User display name persisted under `userName`.
//!
//! Unlike the other stores, the value is stored as raw text, not JSON, to
//! stay readable by the web app that wrote it.

use super::persisted::{Codec, PersistedCell, SubscriptionId};
use super::{LoadOutcome, SaveStatus};
use crate::storage::{KvBackend, StorageError, StorageResult};
use std::rc::Rc;

pub const PROFILE_STORAGE_KEY: &str = "userName";
pub const DEFAULT_USER_NAME: &str = "Friend";

#[derive(Debug, Clone, PartialEq, Eq)]
struct UserName(String);

impl Default for UserName {
    fn default() -> Self {
        Self(DEFAULT_USER_NAME.to_string())
    }
}

pub struct ProfileStore {
    cell: PersistedCell<UserName>,
}

impl ProfileStore {
    pub fn new(backend: Rc<dyn KvBackend>) -> Self {
        let codec = Codec {
            encode: |name: &UserName| -> StorageResult<String> { Ok(name.0.clone()) },
            decode: |raw: &str| -> StorageResult<UserName> { Ok(UserName(raw.to_string())) },
        };
        Self {
            cell: PersistedCell::new(PROFILE_STORAGE_KEY, backend, codec),
        }
    }

    /// Reads the stored name once; a missing or empty value keeps the default.
    pub fn load(&mut self) -> LoadOutcome {
        self.cell.load()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.is_loaded()
    }

    /// Returns the display name, falling back to the default when blank.
    pub fn user_name(&self) -> &str {
        let name = self.cell.get().0.as_str();
        if name.trim().is_empty() {
            DEFAULT_USER_NAME
        } else {
            name
        }
    }

    pub fn set_user_name(&mut self, name: impl Into<String>) -> SaveStatus {
        self.cell.install(UserName(name.into()))
    }

    pub fn clear(&mut self) -> SaveStatus {
        self.cell.clear()
    }

    /// Subscribes to name changes; observers receive the display name.
    pub fn subscribe(&mut self, mut observer: impl FnMut(&str) + 'static) -> SubscriptionId {
        self.cell.subscribe(move |name: &UserName| observer(name.0.as_str()))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.cell.unsubscribe(id)
    }

    pub fn last_failure(&self) -> Option<&StorageError> {
        self.cell.last_failure()
    }
}
