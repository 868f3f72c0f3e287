//! Per-day habit completions persisted under `habitCompletions`.
//!
//! # Invariants
//! - A day key is present only while its list is non-empty. Calendar views
//!   treat key presence as "has a completion", so an empty list is never
//!   stored; the key is deleted instead.
//! - Lists keep insertion order; duplicates are not removed.

use super::persisted::{decode_json, encode_json, Codec, PersistedCell, SubscriptionId};
use super::{LoadOutcome, SaveStatus};
use crate::model::day::DayKey;
use crate::model::habit::HabitId;
use crate::storage::{KvBackend, StorageError, StorageResult};
use log::info;
use serde_json::Value;
use std::collections::BTreeMap;
use std::rc::Rc;

pub const COMPLETIONS_STORAGE_KEY: &str = "habitCompletions";

/// Habit IDs completed per day.
pub type Completions = BTreeMap<DayKey, Vec<HabitId>>;

pub struct CompletionStore {
    cell: PersistedCell<Completions>,
}

impl CompletionStore {
    pub fn new(backend: Rc<dyn KvBackend>) -> Self {
        let codec = Codec {
            encode: encode_json::<Completions>,
            decode: decode_completions,
        };
        Self {
            cell: PersistedCell::new(COMPLETIONS_STORAGE_KEY, backend, codec),
        }
    }

    /// Reads stored completions once.
    ///
    /// Days stored with an empty list are dropped while loading.
    pub fn load(&mut self) -> LoadOutcome {
        self.cell.load()
    }

    pub fn save(&mut self) -> SaveStatus {
        self.cell.save()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.is_loaded()
    }

    pub fn completions(&self) -> &Completions {
        self.cell.get()
    }

    /// Returns the habits completed on `day`, empty when none.
    pub fn for_day(&self, day: &str) -> &[HabitId] {
        self.cell.get().get(day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_completed(&self, day: &str, habit_id: &HabitId) -> bool {
        self.for_day(day).contains(habit_id)
    }

    /// Days in `month` (`YYYY-MM`) with at least one completion, ascending.
    pub fn days_in_month(&self, month: &str) -> Vec<&DayKey> {
        self.cell
            .get()
            .keys()
            .filter(|day| day.in_month(month))
            .collect()
    }

    /// Number of days on which `habit_id` was completed.
    pub fn completion_count(&self, habit_id: &HabitId) -> usize {
        self.cell
            .get()
            .values()
            .filter(|ids| ids.contains(habit_id))
            .count()
    }

    /// Flips `habit_id` for `day`.
    ///
    /// Removes the first occurrence when present, appends otherwise, and
    /// deletes the day key when the resulting list is empty.
    pub fn toggle(&mut self, day: impl Into<DayKey>, habit_id: impl Into<HabitId>) -> SaveStatus {
        let day = day.into();
        let habit_id = habit_id.into();

        self.cell.modify(|current| {
            let mut day_list = current.get(&day).cloned().unwrap_or_default();
            match day_list.iter().position(|id| id == &habit_id) {
                Some(index) => {
                    day_list.remove(index);
                }
                None => day_list.push(habit_id),
            }
            Some(with_day(current, day, day_list))
        })
    }

    /// Replaces the whole list for `day`; an empty list deletes the key.
    pub fn set_for_day<I>(&mut self, day: impl Into<DayKey>, ids: I) -> SaveStatus
    where
        I: IntoIterator,
        I::Item: Into<HabitId>,
    {
        let day_list = ids.into_iter().map(Into::into).collect();
        self.replace_day(day.into(), day_list)
    }

    /// Loosely typed variant of [`CompletionStore::set_for_day`].
    ///
    /// Any non-array value deletes the day key. Array elements that are
    /// strings or integers become IDs; other elements are skipped, and an
    /// array without usable IDs deletes the key too.
    pub fn set_for_day_value(&mut self, day: impl Into<DayKey>, ids: &Value) -> SaveStatus {
        let day_list = match ids {
            Value::Array(items) => items.iter().filter_map(HabitId::from_json).collect(),
            _ => Vec::new(),
        };
        self.replace_day(day.into(), day_list)
    }

    /// Empties every day and removes the stored key.
    pub fn clear(&mut self) -> SaveStatus {
        self.cell.clear()
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&Completions) + 'static) -> SubscriptionId {
        self.cell.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.cell.unsubscribe(id)
    }

    pub fn last_failure(&self) -> Option<&StorageError> {
        self.cell.last_failure()
    }

    fn replace_day(&mut self, day: DayKey, day_list: Vec<HabitId>) -> SaveStatus {
        self.cell
            .modify(|current| Some(with_day(current, day, day_list)))
    }
}

/// Copy of `current` with `day` set to `day_list`, or removed when empty.
fn with_day(current: &Completions, day: DayKey, day_list: Vec<HabitId>) -> Completions {
    let mut next = current.clone();
    if day_list.is_empty() {
        next.remove(&day);
    } else {
        next.insert(day, day_list);
    }
    next
}

fn decode_completions(raw: &str) -> StorageResult<Completions> {
    let mut completions: Completions = decode_json(raw)?;
    let before = completions.len();
    completions.retain(|_, ids| !ids.is_empty());

    let dropped = before - completions.len();
    if dropped > 0 {
        info!(
            "event=store_load module=store status=normalized key={COMPLETIONS_STORAGE_KEY} empty_days_dropped={dropped}"
        );
    }
    Ok(completions)
}
