//! Day key addressing for per-day records.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt::{Display, Formatter};

/// ISO-8601 date string (`YYYY-MM-DD`) used to address completions and moods.
///
/// Any string is accepted. Ordering is lexicographic, which matches calendar
/// order for well-formed ISO dates.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayKey(String);

impl DayKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns whether this day falls into `month` (`YYYY-MM`).
    ///
    /// Matching is prefix based: `2024-01-05` is in `2024-01`, and so is any
    /// other key starting with `2024-01-`.
    pub fn in_month(&self, month: &str) -> bool {
        let month = month.trim_end_matches('-');
        self.0
            .strip_prefix(month)
            .is_some_and(|rest| rest.starts_with('-'))
    }
}

impl Display for DayKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for DayKey {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for DayKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DayKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}
