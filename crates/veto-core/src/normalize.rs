// Map/mode reference extraction from variable-shape action records.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::Action;

/// Positive map identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapId(pub u32);

/// Positive game-mode identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModeId(pub u32);

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ModeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where to look for an id inside a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSource {
    /// The value under the key is the id.
    Field(&'static str),
    /// The value under the key is an object whose `id` is the id.
    Nested(&'static str),
}

impl IdSource {
    fn lookup<'a>(&self, action: &'a Action) -> Option<&'a Value> {
        match self {
            IdSource::Field(key) => action.field(key),
            IdSource::Nested(key) => action.field(key)?.get("id"),
        }
    }
}

/// Map id sources, highest priority first.
pub const MAP_ID_SOURCES: &[IdSource] = &[
    IdSource::Field("map_id"),
    IdSource::Nested("map"),
    IdSource::Field("map"),
    IdSource::Field("id"),
    IdSource::Field("pk"),
];

/// Mode id sources, highest priority first. The objective-specific field
/// wins over the generic ones.
pub const MODE_ID_SOURCES: &[IdSource] = &[
    IdSource::Field("objective_mode_id"),
    IdSource::Field("mode_id"),
    IdSource::Nested("mode"),
    IdSource::Field("mode"),
    IdSource::Field("gamemode"),
];

/// The canonical `(map, mode)` pair extracted from one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NormalizedRef {
    pub map_id: Option<MapId>,
    pub mode_id: Option<ModeId>,
}

/// Extract the map and mode ids from an action. Never fails: fields that
/// are missing or unusable come back as `None`.
pub fn normalize(action: &Action) -> NormalizedRef {
    NormalizedRef {
        map_id: first_positive(action, MAP_ID_SOURCES).map(MapId),
        mode_id: first_positive(action, MODE_ID_SOURCES).map(ModeId),
    }
}

fn first_positive(action: &Action, sources: &[IdSource]) -> Option<u32> {
    sources
        .iter()
        .find_map(|source| source.lookup(action).and_then(positive_id))
}

/// Interpret a JSON value as a positive integer id.
///
/// Accepts integer numbers, integral floats, and numeric strings. Zero,
/// negatives, fractions, and everything else are rejected.
pub fn positive_id(value: &Value) -> Option<u32> {
    let raw = match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                u
            } else {
                let f = n.as_f64()?;
                if f.fract() != 0.0 || f < 1.0 || f > f64::from(u32::MAX) {
                    return None;
                }
                f as u64
            }
        }
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    u32::try_from(raw).ok().filter(|&id| id > 0)
}
