// Series layout: the bans split by track and the picks in game order, with
// display names resolved against the map/mode catalog.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionType, Team};
use crate::candidates::{GroupedCombos, MapInfo};
use crate::classify::{Classifier, Track};
use crate::normalize::{MapId, ModeId};
use crate::series::{Series, SeriesFormat};

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeInfo {
    pub id: ModeId,
    pub name: String,
}

/// Maps, modes and grouped combos as served by the maps API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub maps: Vec<MapInfo>,
    #[serde(default)]
    pub modes: Vec<ModeInfo>,
    #[serde(default)]
    pub grouped: GroupedCombos,
}

impl Catalog {
    pub fn map_name(&self, id: MapId) -> Option<&str> {
        self.maps
            .iter()
            .find(|m| m.id == id)
            .map(|m| m.name.as_str())
            .or_else(|| {
                self.grouped
                    .objective
                    .iter()
                    .chain(&self.grouped.slayer)
                    .flat_map(|g| &g.combos)
                    .find(|c| c.map_id == id && !c.map.is_empty())
                    .map(|c| c.map.as_str())
            })
    }

    pub fn mode_name(&self, id: ModeId) -> Option<&str> {
        self.modes
            .iter()
            .find(|m| m.id == id)
            .map(|m| m.name.as_str())
            .or_else(|| {
                self.grouped
                    .objective
                    .iter()
                    .chain(&self.grouped.slayer)
                    .find(|g| g.mode_id == id)
                    .map(|g| g.mode.as_str())
            })
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// One ban or pick, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutEntry {
    /// Position in the action log.
    pub index: usize,
    pub team: Option<Team>,
    pub team_label: String,
    pub track: Track,
    pub map_id: MapId,
    pub map: String,
    pub mode_id: Option<ModeId>,
    pub mode: String,
}

/// One game of the series, played or still open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameEntry {
    pub game: u32,
    /// Track the game is played on: the format's slot when known, otherwise
    /// the pick's own track.
    pub track: Track,
    pub picker: Option<Team>,
    pub picker_label: String,
    pub pick: Option<LayoutEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesLayout {
    pub format: Option<SeriesFormat>,
    pub objective_bans: Vec<LayoutEntry>,
    pub slayer_bans: Vec<LayoutEntry>,
    /// Every game slot of the format in order, then any picks numbered past
    /// it. Without a known format, only the picked games.
    pub games: Vec<GameEntry>,
}

impl SeriesLayout {
    /// Build the layout for a series. Actions without a resolvable map are
    /// left out, exactly as the exclusion fold ignores them.
    pub fn build(series: &Series, catalog: &Catalog, classifier: &Classifier) -> Self {
        let mut objective_bans = Vec::new();
        let mut slayer_bans = Vec::new();
        let mut picks = Vec::new();

        for (index, action) in series.actions.iter().enumerate() {
            let Some((classified, _)) = classifier.classify_action(index, action) else {
                continue;
            };
            let entry = LayoutEntry {
                index,
                team: classified.team,
                team_label: classified
                    .team
                    .map(|t| series.team_label(t))
                    .unwrap_or_default(),
                track: classified.track,
                map_id: classified.map_id,
                map: map_display(catalog, action, classified.map_id),
                mode_id: classified.mode_id,
                mode: mode_display(catalog, action, classified.track, classified.mode_id),
            };
            match (classified.action_type, classified.track) {
                (ActionType::Ban, Track::Objective) => objective_bans.push(entry),
                (ActionType::Ban, Track::Slayer) => slayer_bans.push(entry),
                (ActionType::Pick, _) => picks.push((action.game_number(), entry)),
                (ActionType::Other, _) => {}
            }
        }

        let format = series.format();
        let mut numbered = number_games(picks);
        let mut games = Vec::new();

        if let Some(format) = format {
            for slot in format.game_slots() {
                games.push(GameEntry {
                    game: slot.game,
                    track: slot.track,
                    picker: Some(slot.picker),
                    picker_label: series.team_label(slot.picker),
                    pick: numbered.remove(&slot.game),
                });
            }
        }
        games.extend(numbered.into_iter().map(|(game, pick)| GameEntry {
            game,
            track: pick.track,
            picker: pick.team,
            picker_label: pick.team_label.clone(),
            pick: Some(pick),
        }));

        SeriesLayout {
            format,
            objective_bans,
            slayer_bans,
            games,
        }
    }

    /// Games still to be picked, when the format is known.
    pub fn remaining_games(&self) -> Option<u32> {
        self.format
            .map(|_| self.games.iter().filter(|g| g.pick.is_none()).count() as u32)
    }

    pub fn is_complete(&self) -> bool {
        self.remaining_games() == Some(0)
    }

    /// The first game that has no pick yet.
    pub fn next_open_game(&self) -> Option<&GameEntry> {
        self.games.iter().find(|g| g.pick.is_none())
    }
}

/// Assign game numbers to picks. A pick keeps its own number unless an
/// earlier pick already claimed it; the rest fill the lowest free numbers
/// in log order.
fn number_games(picks: Vec<(Option<u32>, LayoutEntry)>) -> BTreeMap<u32, LayoutEntry> {
    let mut numbered = BTreeMap::new();
    let mut pending = Vec::new();

    for (game, entry) in picks {
        match game {
            Some(game) if !numbered.contains_key(&game) => {
                numbered.insert(game, entry);
            }
            _ => pending.push(entry),
        }
    }

    let mut next = 1;
    for entry in pending {
        while numbered.contains_key(&next) {
            next += 1;
        }
        numbered.insert(next, entry);
    }

    numbered
}

fn map_display(catalog: &Catalog, action: &Action, map_id: MapId) -> String {
    catalog
        .map_name(map_id)
        .or_else(|| action.map_name())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Map {map_id}"))
}

fn mode_display(catalog: &Catalog, action: &Action, track: Track, mode_id: Option<ModeId>) -> String {
    if track == Track::Slayer {
        return "Slayer".to_string();
    }
    mode_id
        .and_then(|id| catalog.mode_name(id))
        .or_else(|| action.mode_name())
        .map(str::to_string)
        .unwrap_or_else(|| match mode_id {
            Some(id) => format!("Mode {id}"),
            None => "Unknown mode".to_string(),
        })
}
