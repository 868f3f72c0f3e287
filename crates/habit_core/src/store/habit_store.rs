//! Ordered habit collection persisted under `userHabits`.
//!
//! # Invariants
//! - Insertion order is preserved; IDs are not checked for uniqueness.
//! - `update` with an unknown ID changes nothing: no install, no save,
//!   no notification.

use super::persisted::{Codec, PersistedCell, SubscriptionId};
use super::{LoadOutcome, SaveStatus};
use crate::model::habit::{Habit, HabitId};
use crate::storage::{KvBackend, StorageError};
use std::rc::Rc;

pub const HABITS_STORAGE_KEY: &str = "userHabits";

pub struct HabitStore {
    cell: PersistedCell<Vec<Habit>>,
}

impl HabitStore {
    /// Creates an unloaded store.
    ///
    /// Call [`HabitStore::load`] before reading; the first write loads on
    /// its own.
    pub fn new(backend: Rc<dyn KvBackend>) -> Self {
        Self {
            cell: PersistedCell::new(HABITS_STORAGE_KEY, backend, Codec::json()),
        }
    }

    /// Reads the stored collection once.
    ///
    /// Malformed stored text resets the collection to empty.
    pub fn load(&mut self) -> LoadOutcome {
        self.cell.load()
    }

    /// Writes the current collection without changing it.
    pub fn save(&mut self) -> SaveStatus {
        self.cell.save()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.is_loaded()
    }

    pub fn habits(&self) -> &[Habit] {
        self.cell.get()
    }

    /// Returns the first habit with `id`.
    pub fn get(&self, id: &HabitId) -> Option<&Habit> {
        self.cell.get().iter().find(|habit| &habit.id == id)
    }

    pub fn len(&self) -> usize {
        self.cell.get().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cell.get().is_empty()
    }

    /// Appends `habit` to the end of the collection.
    pub fn add(&mut self, habit: Habit) -> SaveStatus {
        self.cell.modify(|current| {
            let mut next = current.clone();
            next.push(habit);
            Some(next)
        })
    }

    /// Shallow-merges `patch` into the first habit with the same ID.
    ///
    /// Returns [`SaveStatus::Skipped`] when no habit has that ID.
    pub fn update(&mut self, patch: &Habit) -> SaveStatus {
        self.cell.modify(|current| {
            let index = current.iter().position(|habit| habit.id == patch.id)?;
            let mut next = current.clone();
            next[index] = current[index].merged(patch);
            Some(next)
        })
    }

    /// Removes every habit with `id` and saves, even if none matched.
    pub fn delete(&mut self, id: &HabitId) -> SaveStatus {
        self.cell.modify(|current| {
            Some(
                current
                    .iter()
                    .filter(|habit| &habit.id != id)
                    .cloned()
                    .collect(),
            )
        })
    }

    /// Empties the collection and removes the stored key.
    pub fn clear(&mut self) -> SaveStatus {
        self.cell.clear()
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&Vec<Habit>) + 'static) -> SubscriptionId {
        self.cell.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.cell.unsubscribe(id)
    }

    /// Returns the failure from the most recent load or save, if any.
    pub fn last_failure(&self) -> Option<&StorageError> {
        self.cell.last_failure()
    }
}

#[cfg(test)]
mod tests {
    use super::{HabitStore, HABITS_STORAGE_KEY};
    use crate::model::habit::{Habit, HabitId};
    use crate::storage::MemoryBackend;
    use crate::store::{LoadOutcome, SaveStatus};
    use serde_json::{json, Value};
    use std::rc::Rc;

    fn stored_json(backend: &MemoryBackend) -> Value {
        let raw = backend.snapshot().remove(HABITS_STORAGE_KEY).unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn add_then_update_merges_fields() {
        let backend = Rc::new(MemoryBackend::new());
        let mut store = HabitStore::new(backend.clone());
        store.load();

        store.add(Habit::new("h1").with_field("name", "Run"));
        let status = store.update(&Habit::new("h1").with_field("name", "Run daily"));

        assert_eq!(status, SaveStatus::Saved);
        assert_eq!(stored_json(&backend), json!([{"id": "h1", "name": "Run daily"}]));
    }

    #[test]
    fn update_unknown_id_is_a_no_op() {
        let backend = Rc::new(MemoryBackend::new());
        let mut store = HabitStore::new(backend.clone());
        store.load();
        store.add(Habit::new("h1").with_field("name", "Run"));
        let before = backend.snapshot();

        let status = store.update(&Habit::new("missing").with_field("name", "x"));

        assert_eq!(status, SaveStatus::Skipped);
        assert_eq!(store.habits(), &[Habit::new("h1").with_field("name", "Run")]);
        assert_eq!(backend.snapshot(), before);
    }

    #[test]
    fn delete_removes_all_duplicates() {
        let backend = Rc::new(MemoryBackend::new());
        let mut store = HabitStore::new(backend.clone());
        store.load();
        store.add(Habit::new("h1"));
        store.add(Habit::new("h2"));
        store.add(Habit::new("h1"));

        store.delete(&HabitId::new("h1"));

        assert_eq!(store.len(), 1);
        assert_eq!(stored_json(&backend), json!([{"id": "h2"}]));
    }

    #[test]
    fn malformed_payload_recovers_to_empty() {
        let backend = Rc::new(MemoryBackend::new());
        backend.seed(HABITS_STORAGE_KEY, "{not json");
        let mut store = HabitStore::new(backend);

        assert_eq!(store.load(), LoadOutcome::Recovered);
        assert!(store.is_empty());
        assert!(store.last_failure().is_some());
    }

    #[test]
    fn add_before_load_keeps_stored_habits() {
        let backend = Rc::new(MemoryBackend::new());
        backend.seed(HABITS_STORAGE_KEY, r#"[{"id":"h1","name":"Run"},{"id":"h2"}]"#);
        let mut store = HabitStore::new(backend.clone());

        assert_eq!(store.add(Habit::new("h3")), SaveStatus::Saved);

        assert_eq!(
            stored_json(&backend),
            json!([{"id": "h1", "name": "Run"}, {"id": "h2"}, {"id": "h3"}])
        );
        assert_eq!(store.load(), LoadOutcome::AlreadyLoaded);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn update_before_load_merges_into_stored_habit() {
        let backend = Rc::new(MemoryBackend::new());
        backend.seed(HABITS_STORAGE_KEY, r#"[{"id":"h1","name":"Run","goal":3}]"#);
        let mut store = HabitStore::new(backend.clone());

        let status = store.update(&Habit::new("h1").with_field("name", "Run daily"));

        assert_eq!(status, SaveStatus::Saved);
        assert_eq!(
            stored_json(&backend),
            json!([{"id": "h1", "name": "Run daily", "goal": 3}])
        );
    }
}
