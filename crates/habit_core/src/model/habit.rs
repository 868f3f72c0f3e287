//! Habit domain model.
//!
//! # Responsibility
//! - Define the habit record: a stable `id` plus user-defined fields.
//! - Provide shallow-merge semantics used by habit updates.
//!
//! # Invariants
//! - `id` is the only identity; it is never stored inside `fields`.
//! - Field order and unknown fields survive a load/save cycle.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const ID_FIELD: &str = "id";

/// Stable habit identifier.
///
/// Serialized as a JSON string. Numeric IDs written by older web builds
/// (e.g. `Date.now()` values) are accepted on read and kept as their decimal
/// text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct HabitId(String);

impl HabitId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Creates a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Interprets a loosely typed JSON value as an ID.
    ///
    /// Strings and integers are IDs; anything else is not.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => Some(Self::new(text.as_str())),
            Value::Number(number) if number.is_i64() || number.is_u64() => {
                Some(Self(number.to_string()))
            }
            _ => None,
        }
    }
}

impl Display for HabitId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HabitId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for HabitId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for HabitId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => Self(text),
            RawId::Signed(value) => Self(value.to_string()),
            RawId::Unsigned(value) => Self(value.to_string()),
        })
    }
}

/// One tracked habit.
///
/// Only `id` has meaning to the store layer. Everything else (`name`,
/// `color`, `goal`, ...) belongs to the view layer and is kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl Habit {
    /// Creates a habit with no user-defined fields.
    pub fn new(id: impl Into<HabitId>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style variant of [`Habit::set_field`].
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_field(key, value);
        self
    }

    /// Sets one user-defined field and returns the previous value.
    ///
    /// The reserved `id` key is ignored; identity only changes through `id`.
    pub fn set_field(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        if key == ID_FIELD {
            return None;
        }
        self.fields.insert(key, value.into())
    }

    pub fn remove_field(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Convenience accessor for the conventional `name` field.
    pub fn name(&self) -> Option<&str> {
        self.fields.get("name").and_then(Value::as_str)
    }

    /// Returns a new record with `patch` shallow-merged over `self`.
    ///
    /// Fields present in `patch` win; fields absent from it are preserved.
    /// Nested objects are replaced, not merged.
    pub fn merged(&self, patch: &Habit) -> Habit {
        let mut next = self.clone();
        for (key, value) in &patch.fields {
            next.fields.insert(key.clone(), value.clone());
        }
        next
    }
}
