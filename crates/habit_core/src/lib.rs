//! Core persisted state for the habit tracker.
//! This crate is the single source of truth for habit, completion and mood
//! invariants; view layers only read state and call mutations.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod storage;
pub mod store;

pub use config::{ConfigError, TrackerConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::day::DayKey;
pub use model::habit::{Habit, HabitId};
pub use model::mood::{find_mood, mood_catalog, Mood, MoodId};
pub use service::tracker::{HabitTracker, LoadReport, TrackerError, TrackerSummary};
pub use storage::{KvBackend, MemoryBackend, SqliteBackend, StorageError, StorageResult};
pub use store::{
    CompletionStore, Completions, HabitStore, LoadOutcome, MoodEntries, MoodStore, ProfileStore,
    SaveStatus, SubscriptionId,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
