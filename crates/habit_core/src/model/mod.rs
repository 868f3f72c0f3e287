//! Domain model for habits, per-day completions and moods.
//!
//! # Responsibility
//! - Define the records persisted by the store layer.
//! - Keep the JSON shape compatible with data written by the web app.
//!
//! # Invariants
//! - Habit identity is the `id` field; everything else is free-form.
//! - Day keys are opaque strings; no calendar validation happens here.
//! - The mood catalog is static configuration, never persisted state.

pub mod day;
pub mod habit;
pub mod mood;
