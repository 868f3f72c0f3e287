//! Mood model and the static selectable catalog.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Numeric identity of a catalog mood.
pub type MoodId = u32;

/// Mood descriptor stored per day.
///
/// Stored entries are full copies of a catalog entry, so a day keeps its
/// glyph even if the catalog is later edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mood {
    pub id: MoodId,
    pub name: String,
    pub emoji: String,
}

impl Mood {
    pub fn new(id: MoodId, name: impl Into<String>, emoji: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            emoji: emoji.into(),
        }
    }
}

static MOOD_CATALOG: Lazy<Vec<Mood>> = Lazy::new(|| {
    vec![
        Mood::new(1, "Happy", "😊"),
        Mood::new(2, "Sad", "😢"),
        Mood::new(3, "Angry", "😠"),
        Mood::new(4, "Calm", "😌"),
        Mood::new(5, "Anxious", "😰"),
        Mood::new(6, "Motivated", "💪"),
    ]
});

/// Returns the fixed list of selectable moods, in display order.
pub fn mood_catalog() -> &'static [Mood] {
    MOOD_CATALOG.as_slice()
}

/// Looks up one catalog mood by id.
pub fn find_mood(id: MoodId) -> Option<&'static Mood> {
    MOOD_CATALOG.iter().find(|mood| mood.id == id)
}
