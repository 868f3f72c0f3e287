//! Per-day mood entries persisted under `moodEntries`.
//!
//! # Invariants
//! - A day without a mood has no key; no placeholder value is stored.
//! - Deleting a missing day changes nothing and writes nothing.

use super::persisted::{Codec, PersistedCell, SubscriptionId};
use super::{LoadOutcome, SaveStatus};
use crate::model::day::DayKey;
use crate::model::mood::{find_mood, mood_catalog, Mood, MoodId};
use crate::storage::{KvBackend, StorageError};
use std::collections::BTreeMap;
use std::rc::Rc;

pub const MOODS_STORAGE_KEY: &str = "moodEntries";

/// Selected mood per day.
pub type MoodEntries = BTreeMap<DayKey, Mood>;

pub struct MoodStore {
    cell: PersistedCell<MoodEntries>,
}

impl MoodStore {
    pub fn new(backend: Rc<dyn KvBackend>) -> Self {
        Self {
            cell: PersistedCell::new(MOODS_STORAGE_KEY, backend, Codec::json()),
        }
    }

    pub fn load(&mut self) -> LoadOutcome {
        self.cell.load()
    }

    pub fn save(&mut self) -> SaveStatus {
        self.cell.save()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.is_loaded()
    }

    /// The fixed list of selectable moods.
    pub fn catalog(&self) -> &'static [Mood] {
        mood_catalog()
    }

    pub fn entries(&self) -> &MoodEntries {
        self.cell.get()
    }

    /// Returns the mood stored for `day`, or `None` when there is none.
    pub fn get_for_day(&self, day: &str) -> Option<&Mood> {
        self.cell.get().get(day)
    }

    /// Mood entries for `month` (`YYYY-MM`), ascending by day.
    pub fn entries_in_month(&self, month: &str) -> Vec<(&DayKey, &Mood)> {
        self.cell
            .get()
            .iter()
            .filter(|(day, _)| day.in_month(month))
            .collect()
    }

    /// Stores `mood` for `day`, replacing any previous entry.
    pub fn set_for_day(&mut self, day: impl Into<DayKey>, mood: Mood) -> SaveStatus {
        let day = day.into();
        self.cell.modify(|current| {
            let mut next = current.clone();
            next.insert(day, mood);
            Some(next)
        })
    }

    /// Stores the catalog mood `mood_id` for `day`.
    ///
    /// Returns [`SaveStatus::Skipped`] when the id is not in the catalog.
    pub fn set_catalog_mood_for_day(
        &mut self,
        day: impl Into<DayKey>,
        mood_id: MoodId,
    ) -> SaveStatus {
        match find_mood(mood_id) {
            Some(mood) => self.set_for_day(day, mood.clone()),
            None => SaveStatus::Skipped,
        }
    }

    /// Removes the entry for `day`; skipped when there is none.
    pub fn delete_for_day(&mut self, day: &str) -> SaveStatus {
        self.cell.modify(|current| {
            if !current.contains_key(day) {
                return None;
            }
            let mut next = current.clone();
            next.remove(day);
            Some(next)
        })
    }

    pub fn clear(&mut self) -> SaveStatus {
        self.cell.clear()
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&MoodEntries) + 'static) -> SubscriptionId {
        self.cell.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.cell.unsubscribe(id)
    }

    pub fn last_failure(&self) -> Option<&StorageError> {
        self.cell.last_failure()
    }
}
