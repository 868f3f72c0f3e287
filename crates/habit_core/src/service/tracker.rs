//! Habit tracker composition root.
//!
//! # Responsibility
//! - Own the four stores over one shared backend.
//! - Bootstrap logging and the SQLite backend from `TrackerConfig`.
//!
//! # Invariants
//! - Stores stay independent; the tracker never mutates one store in
//!   response to another.
//! - `open` loads every store before returning.

use crate::config::TrackerConfig;
use crate::db::DbError;
use crate::logging::{init_logging, LoggingError};
use crate::storage::{KvBackend, SqliteBackend};
use crate::store::{
    CompletionStore, HabitStore, LoadOutcome, MoodStore, ProfileStore, SaveStatus,
};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

#[derive(Debug)]
pub enum TrackerError {
    Logging(LoggingError),
    Db(DbError),
}

impl Display for TrackerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logging(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TrackerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Logging(err) => Some(err),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<LoggingError> for TrackerError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<DbError> for TrackerError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

/// Per-store outcome of [`HabitTracker::load_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub habits: LoadOutcome,
    pub completions: LoadOutcome,
    pub moods: LoadOutcome,
    pub profile: LoadOutcome,
}

/// Counts shown by status surfaces such as the CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerSummary {
    pub user_name: String,
    pub habit_count: usize,
    pub completed_days: usize,
    pub mood_days: usize,
}

pub struct HabitTracker {
    habits: HabitStore,
    completions: CompletionStore,
    moods: MoodStore,
    profile: ProfileStore,
}

impl HabitTracker {
    /// Creates unloaded stores sharing `backend`.
    pub fn new(backend: Rc<dyn KvBackend>) -> Self {
        Self {
            habits: HabitStore::new(backend.clone()),
            completions: CompletionStore::new(backend.clone()),
            moods: MoodStore::new(backend.clone()),
            profile: ProfileStore::new(backend),
        }
    }

    /// Opens the configured backend and loads every store.
    ///
    /// # Errors
    /// - Logging bootstrap failures when `log_dir` is set.
    /// - SQLite open or migration failures.
    pub fn open(config: &TrackerConfig) -> Result<Self, TrackerError> {
        if let Some(log_dir) = &config.log_dir {
            init_logging(&config.log_level, log_dir)?;
        }

        let backend = match &config.db_path {
            Some(path) => SqliteBackend::open(path)?,
            None => SqliteBackend::open_in_memory()?,
        };
        let backend = match config.quota_bytes {
            Some(quota_bytes) => backend.with_quota(quota_bytes),
            None => backend,
        };

        let mut tracker = Self::new(Rc::new(backend));
        let report = tracker.load_all();
        info!(
            "event=tracker_open module=service status=ok habits={:?} completions={:?} moods={:?} profile={:?}",
            report.habits, report.completions, report.moods, report.profile
        );
        Ok(tracker)
    }

    /// Loads every store; stores already loaded report `AlreadyLoaded`.
    pub fn load_all(&mut self) -> LoadReport {
        LoadReport {
            habits: self.habits.load(),
            completions: self.completions.load(),
            moods: self.moods.load(),
            profile: self.profile.load(),
        }
    }

    pub fn habits(&self) -> &HabitStore {
        &self.habits
    }

    pub fn habits_mut(&mut self) -> &mut HabitStore {
        &mut self.habits
    }

    pub fn completions(&self) -> &CompletionStore {
        &self.completions
    }

    pub fn completions_mut(&mut self) -> &mut CompletionStore {
        &mut self.completions
    }

    pub fn moods(&self) -> &MoodStore {
        &self.moods
    }

    pub fn moods_mut(&mut self) -> &mut MoodStore {
        &mut self.moods
    }

    pub fn profile(&self) -> &ProfileStore {
        &self.profile
    }

    pub fn profile_mut(&mut self) -> &mut ProfileStore {
        &mut self.profile
    }

    pub fn summary(&self) -> TrackerSummary {
        TrackerSummary {
            user_name: self.profile.user_name().to_string(),
            habit_count: self.habits.len(),
            completed_days: self.completions.completions().len(),
            mood_days: self.moods.entries().len(),
        }
    }

    /// Clears every store and its stored key.
    ///
    /// Returns the first non-`Saved` status, or `Saved` when all succeed.
    pub fn clear_all(&mut self) -> SaveStatus {
        [
            self.habits.clear(),
            self.completions.clear(),
            self.moods.clear(),
            self.profile.clear(),
        ]
        .into_iter()
        .find(|status| *status != SaveStatus::Saved)
        .unwrap_or(SaveStatus::Saved)
    }
}
