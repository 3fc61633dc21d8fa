// Candidate pool filtering: which combos and slayer maps can still be chosen
// on the current turn.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::action::{KindTag, Team, KIND_OBJECTIVE_COMBO, KIND_SLAYER_MAP};
use crate::classify::Track;
use crate::exclusions::Exclusions;
use crate::lenient;
use crate::normalize::{MapId, ModeId};

// ---------------------------------------------------------------------------
// Pool shapes (as served by the maps API)
// ---------------------------------------------------------------------------

/// One map inside a mode group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboEntry {
    pub map_id: MapId,
    /// Map display name.
    #[serde(default)]
    pub map: String,
}

/// All maps playable in one mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboGroup {
    /// Mode display name.
    pub mode: String,
    pub mode_id: ModeId,
    #[serde(default)]
    pub combos: Vec<ComboEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedCombos {
    #[serde(default)]
    pub objective: Vec<ComboGroup>,
    #[serde(default)]
    pub slayer: Vec<ComboGroup>,
}

/// A mode entry in a map's capability list: either a bare name or an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModeRef {
    Name(String),
    Detailed {
        #[serde(default)]
        id: Option<ModeId>,
        #[serde(default)]
        name: String,
    },
}

impl ModeRef {
    pub fn name(&self) -> &str {
        match self {
            ModeRef::Name(name) => name,
            ModeRef::Detailed { name, .. } => name,
        }
    }

    fn is_slayer(&self) -> bool {
        self.name().to_lowercase().contains("slayer")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapInfo {
    pub id: MapId,
    pub name: String,
    #[serde(default)]
    pub modes: Vec<ModeRef>,
}

impl MapInfo {
    /// Whether the map can be played as Slayer. Maps without a capability
    /// list are assumed to support it.
    pub fn supports_slayer(&self) -> bool {
        self.modes.is_empty() || self.modes.iter().any(ModeRef::is_slayer)
    }
}

// ---------------------------------------------------------------------------
// Per-candidate status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateStatus {
    Available,
    Banned,
    Picked,
}

/// Status of an objective combo. A ban is reported ahead of a pick.
pub fn combo_status(exclusions: &Exclusions, map_id: MapId, mode_id: ModeId) -> CandidateStatus {
    if exclusions.is_combo_banned(map_id, mode_id) {
        CandidateStatus::Banned
    } else if exclusions.is_map_picked(map_id) || exclusions.is_combo_picked(map_id, mode_id) {
        CandidateStatus::Picked
    } else {
        CandidateStatus::Available
    }
}

/// Status of a map on the slayer track.
pub fn slayer_map_status(exclusions: &Exclusions, map_id: MapId) -> CandidateStatus {
    if exclusions.is_slayer_map_banned(map_id) {
        CandidateStatus::Banned
    } else if exclusions.is_map_picked(map_id) {
        CandidateStatus::Picked
    } else {
        CandidateStatus::Available
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Objective groups with only the combos that are still selectable. A map
/// consumed by any pick is removed from every mode. Empty groups are dropped;
/// group and combo order is preserved.
pub fn available_objective_combos(groups: &[ComboGroup], exclusions: &Exclusions) -> Vec<ComboGroup> {
    groups
        .iter()
        .filter_map(|group| {
            let combos: Vec<ComboEntry> = group
                .combos
                .iter()
                .filter(|c| combo_status(exclusions, c.map_id, group.mode_id) == CandidateStatus::Available)
                .cloned()
                .collect();
            (!combos.is_empty()).then(|| ComboGroup {
                mode: group.mode.clone(),
                mode_id: group.mode_id,
                combos,
            })
        })
        .collect()
}

/// Every map that could be offered on the slayer track, available or not.
///
/// Taken from the `slayer` groups when the API provides them, otherwise from
/// every map whose capability list includes Slayer. Each map appears once,
/// in first-seen order.
pub fn slayer_candidates(grouped: &GroupedCombos, maps: &[MapInfo]) -> Vec<ComboEntry> {
    let candidates: Vec<ComboEntry> = if grouped.slayer.iter().any(|g| !g.combos.is_empty()) {
        grouped
            .slayer
            .iter()
            .flat_map(|g| g.combos.iter().cloned())
            .collect()
    } else {
        maps.iter()
            .filter(|m| m.supports_slayer())
            .map(|m| ComboEntry {
                map_id: m.id,
                map: m.name.clone(),
            })
            .collect()
    };

    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.map_id))
        .collect()
}

/// Slayer maps that are still selectable.
pub fn available_slayer_maps(
    grouped: &GroupedCombos,
    maps: &[MapInfo],
    exclusions: &Exclusions,
) -> Vec<ComboEntry> {
    slayer_candidates(grouped, maps)
        .into_iter()
        .filter(|c| slayer_map_status(exclusions, c.map_id) == CandidateStatus::Available)
        .collect()
}

// ---------------------------------------------------------------------------
// Current turn
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TurnAction {
    Ban,
    Pick,
}

impl TurnAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnAction::Ban => "BAN",
            TurnAction::Pick => "PICK",
        }
    }
}

/// Whose turn it is and what they must do, as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnDescriptor {
    pub action: TurnAction,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient::team")]
    pub team: Option<Team>,
}

impl TurnDescriptor {
    pub fn new(action: TurnAction, track: Track, team: Team) -> Self {
        let kind = match track {
            Track::Objective => KIND_OBJECTIVE_COMBO,
            Track::Slayer => KIND_SLAYER_MAP,
        };
        TurnDescriptor {
            action,
            kind: Some(kind.to_string()),
            team: Some(team),
        }
    }

    /// Track the caller should offer choices from. Anything that does not
    /// mention OBJECTIVE is treated as a slayer turn.
    pub fn track(&self) -> Track {
        match self.kind.as_deref().map(KindTag::parse) {
            Some(KindTag::Objective) => Track::Objective,
            _ => Track::Slayer,
        }
    }
}

/// The choices open on a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "track", content = "options", rename_all = "lowercase")]
pub enum TurnOptions {
    Objective(Vec<ComboGroup>),
    Slayer(Vec<ComboEntry>),
}

impl TurnOptions {
    pub fn is_empty(&self) -> bool {
        match self {
            TurnOptions::Objective(groups) => groups.is_empty(),
            TurnOptions::Slayer(maps) => maps.is_empty(),
        }
    }

    /// Total number of selectable entries.
    pub fn len(&self) -> usize {
        match self {
            TurnOptions::Objective(groups) => groups.iter().map(|g| g.combos.len()).sum(),
            TurnOptions::Slayer(maps) => maps.len(),
        }
    }
}

pub fn available_for_turn(
    turn: &TurnDescriptor,
    grouped: &GroupedCombos,
    maps: &[MapInfo],
    exclusions: &Exclusions,
) -> TurnOptions {
    match turn.track() {
        Track::Objective => {
            TurnOptions::Objective(available_objective_combos(&grouped.objective, exclusions))
        }
        Track::Slayer => TurnOptions::Slayer(available_slayer_maps(grouped, maps, exclusions)),
    }
}
