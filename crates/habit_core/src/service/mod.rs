//! Core use-case services.
//!
//! # Responsibility
//! - Compose stores into the object the view layer holds.
//! - Keep view code decoupled from backend and bootstrap details.

pub mod tracker;
