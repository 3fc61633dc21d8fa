// Draft action records as delivered by the series API.
//
// The API has shipped several shapes for the same event over time, so only
// the fields every shape agrees on are typed. Map and mode references stay
// in the raw field map and are resolved by `normalize`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::lenient;
use crate::normalize::positive_id;

// ---------------------------------------------------------------------------
// Action type
// ---------------------------------------------------------------------------

/// Whether an action removes an option (ban) or consumes it (pick).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionType {
    Ban,
    Pick,
    /// Any other action type the backend may log (undo markers, etc.).
    /// Contributes nothing to availability.
    #[default]
    #[serde(other)]
    Other,
}

impl ActionType {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "BAN" => ActionType::Ban,
            "PICK" => ActionType::Pick,
            _ => ActionType::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Ban => "BAN",
            ActionType::Pick => "PICK",
            ActionType::Other => "OTHER",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Team side
// ---------------------------------------------------------------------------

/// Side identifier. Carried through for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    A,
    B,
}

impl Team {
    /// Parse "A" / "B", ignoring case and surrounding whitespace.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "A" | "a" => Some(Team::A),
            "B" | "b" => Some(Team::B),
            _ => None,
        }
    }

    /// Display label for this side, given the series' team names.
    /// Empty names fall back to "Team A" / "Team B".
    pub fn label(&self, team_a: &str, team_b: &str) -> String {
        let name = match self {
            Team::A => team_a,
            Team::B => team_b,
        };
        if name.trim().is_empty() {
            format!("Team {}", self)
        } else {
            name.to_string()
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::A => f.write_str("A"),
            Team::B => f.write_str("B"),
        }
    }
}

// ---------------------------------------------------------------------------
// Explicit track tag
// ---------------------------------------------------------------------------

pub const KIND_SLAYER_MAP: &str = "SLAYER_MAP";
pub const KIND_OBJECTIVE_COMBO: &str = "OBJECTIVE_COMBO";

/// Keys that may carry the explicit track tag, newest first.
const KIND_KEYS: [&str; 2] = ["kind", "ban_type"];

/// Keys that may carry a pick's 1-based game number, in priority order.
pub const GAME_NUMBER_KEYS: [&str; 3] = ["game", "step", "round"];

/// The explicit track tag an action may carry in its `kind` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KindTag {
    /// Exactly `SLAYER_MAP`.
    SlayerMap,
    /// Any tag mentioning `OBJECTIVE` (`OBJECTIVE_COMBO` and its variants).
    Objective,
    /// Present but meaningless for track classification.
    Unrecognized,
}

impl KindTag {
    pub fn parse(raw: &str) -> Self {
        if raw == KIND_SLAYER_MAP {
            KindTag::SlayerMap
        } else if raw.contains("OBJECTIVE") {
            KindTag::Objective
        } else {
            KindTag::Unrecognized
        }
    }
}

// ---------------------------------------------------------------------------
// Action record
// ---------------------------------------------------------------------------

/// One ban or pick event from the series action log.
///
/// Deserialization never fails for an object: a missing or unknown
/// `action_type` reads as `Other` and a `team` that is not a side letter
/// reads as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(default, deserialize_with = "lenient::action_type")]
    pub action_type: ActionType,
    #[serde(
        default,
        deserialize_with = "lenient::team",
        skip_serializing_if = "Option::is_none"
    )]
    pub team: Option<Team>,
    /// Every other field, verbatim.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Action {
    pub fn new(action_type: ActionType) -> Self {
        Action {
            action_type,
            team: None,
            fields: Map::new(),
        }
    }

    pub fn ban() -> Self {
        Action::new(ActionType::Ban)
    }

    pub fn pick() -> Self {
        Action::new(ActionType::Pick)
    }

    pub fn with_team(mut self, team: Team) -> Self {
        self.team = Some(team);
        self
    }

    pub fn with_game(self, game: u32) -> Self {
        self.with_field("game", game)
    }

    /// Set a raw field, replacing any previous value under the same key.
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Raw field lookup. JSON `null` counts as absent.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|v| !v.is_null())
    }

    /// The explicit track tag, read from `kind` or the legacy `ban_type` key.
    /// Blank and non-string values are skipped.
    pub fn kind(&self) -> Option<KindTag> {
        KIND_KEYS
            .iter()
            .filter_map(|key| self.field(key).and_then(Value::as_str))
            .find(|raw| !raw.trim().is_empty())
            .map(KindTag::parse)
    }

    /// 1-based game number of a pick, from `game`, `step` or `round`.
    pub fn game_number(&self) -> Option<u32> {
        GAME_NUMBER_KEYS
            .iter()
            .find_map(|key| self.field(key).and_then(positive_id))
    }

    /// Display name of the referenced map, when the record carries one.
    pub fn map_name(&self) -> Option<&str> {
        self.display_name("map_name", "map")
    }

    /// Display name of the referenced mode, when the record carries one.
    pub fn mode_name(&self) -> Option<&str> {
        self.display_name("mode_name", "mode")
    }

    fn display_name(&self, name_key: &str, ref_key: &str) -> Option<&str> {
        if let Some(name) = self.field(name_key).and_then(Value::as_str) {
            return Some(name);
        }
        match self.field(ref_key)? {
            Value::Object(obj) => obj.get("name").and_then(Value::as_str),
            // A numeric string is an id, not a name.
            Value::String(s) if s.trim().parse::<i64>().is_err() => Some(s.as_str()),
            _ => None,
        }
    }
}
