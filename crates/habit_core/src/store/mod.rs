//! Persisted state stores consumed by the view layer.
//!
//! # Responsibility
//! - Keep habits, completions, moods and the profile in memory.
//! - Synchronize every mutation to a `KvBackend` under a fixed key.
//! - Notify subscribers after state changes.
//!
//! # Invariants
//! - Load runs at most once per store instance.
//! - Mutations build a fresh state value, install it, then save.
//! - Load and save failures never reach callers as errors; they are
//!   reported through `LoadOutcome`, `SaveStatus`, `last_failure()` and logs.

pub mod completion_store;
pub mod habit_store;
pub mod mood_store;
mod persisted;
pub mod profile_store;

pub use completion_store::{Completions, CompletionStore};
pub use habit_store::HabitStore;
pub use mood_store::{MoodEntries, MoodStore};
pub use persisted::SubscriptionId;
pub use profile_store::ProfileStore;

/// Result of a `load()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Stored state was read and installed.
    Loaded,
    /// Nothing was stored; the empty default stays in place.
    Empty,
    /// Stored state could not be read or parsed; reset to the default.
    Recovered,
    /// Backend availability check failed; nothing was read.
    Unavailable,
    /// A previous `load()` already ran on this store.
    AlreadyLoaded,
}

/// Result of a mutation or explicit save.
///
/// The in-memory state change stands for every variant except `Skipped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    /// State was written to the backend.
    Saved,
    /// Backend availability check failed; state is only in memory.
    Unavailable,
    /// Encoding or the backend write failed; state is only in memory.
    Failed,
    /// The call was a no-op; nothing changed and nothing was written.
    Skipped,
}
