// Series snapshot as returned by the series API, plus JSON loading helpers.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::action::{Action, Team};
use crate::candidates::TurnDescriptor;
use crate::classify::Track;
use crate::layout::Catalog;
use crate::lenient;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// Series format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeriesFormat {
    Bo3,
    Bo5,
    Bo7,
}

impl SeriesFormat {
    /// Parse "Bo7", "BO7", "bo7", etc.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "bo3" => Some(SeriesFormat::Bo3),
            "bo5" => Some(SeriesFormat::Bo5),
            "bo7" => Some(SeriesFormat::Bo7),
            _ => None,
        }
    }

    pub fn games(&self) -> u32 {
        match self {
            SeriesFormat::Bo3 => 3,
            SeriesFormat::Bo5 => 5,
            SeriesFormat::Bo7 => 7,
        }
    }

    /// Objective combo bans made before the first pick.
    pub fn objective_bans(&self) -> usize {
        match self {
            SeriesFormat::Bo7 => 5,
            SeriesFormat::Bo3 | SeriesFormat::Bo5 => 3,
        }
    }

    /// Slayer map bans made before the first pick.
    pub fn slayer_bans(&self) -> usize {
        2
    }

    /// The fixed game order: which track each game is played on and which
    /// side picks it. Shorter formats play the leading games of the Bo7 order.
    pub fn game_slots(&self) -> &'static [GameSlot] {
        &GAME_ORDER[..self.games() as usize]
    }

    pub fn game_slot(&self, game: u32) -> Option<GameSlot> {
        self.game_slots().iter().find(|s| s.game == game).copied()
    }
}

/// One game of a series and who chooses what is played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameSlot {
    pub game: u32,
    pub track: Track,
    pub picker: Team,
}

const fn slot(game: u32, track: Track, picker: Team) -> GameSlot {
    GameSlot {
        game,
        track,
        picker,
    }
}

const GAME_ORDER: [GameSlot; 7] = [
    slot(1, Track::Objective, Team::B),
    slot(2, Track::Slayer, Team::A),
    slot(3, Track::Objective, Team::B),
    slot(4, Track::Objective, Team::A),
    slot(5, Track::Slayer, Team::B),
    slot(6, Track::Objective, Team::A),
    slot(7, Track::Slayer, Team::B),
];

impl fmt::Display for SeriesFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bo{}", self.games())
    }
}

// ---------------------------------------------------------------------------
// Series snapshot
// ---------------------------------------------------------------------------

/// Series snapshot. Every field is optional and read leniently: a value of
/// an unexpected shape is dropped instead of failing the load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub id: Option<u64>,
    /// Team name; the API may send a name, a team id, or a team object.
    #[serde(default, deserialize_with = "lenient::team_name")]
    pub team_a: Option<String>,
    #[serde(default, deserialize_with = "lenient::team_name")]
    pub team_b: Option<String>,
    #[serde(default, alias = "type", deserialize_with = "lenient::opt")]
    pub series_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub status: Option<String>,
    /// Current turn; absent once the draft is over.
    #[serde(default, deserialize_with = "lenient::opt")]
    pub turn: Option<TurnDescriptor>,
    #[serde(default, deserialize_with = "lenient::actions")]
    pub actions: Vec<Action>,
}

impl Series {
    pub fn format(&self) -> Option<SeriesFormat> {
        self.series_type.as_deref().and_then(SeriesFormat::parse)
    }

    /// Display label for a side, falling back to "Team A" / "Team B".
    pub fn team_label(&self, team: Team) -> String {
        team.label(
            self.team_a.as_deref().unwrap_or_default(),
            self.team_b.as_deref().unwrap_or_default(),
        )
    }

    /// Side currently on turn, if the backend reports one.
    pub fn current_picker_side(&self) -> Option<Team> {
        self.turn.as_ref().and_then(|t| t.team)
    }

    pub fn current_picker_label(&self) -> Option<String> {
        self.current_picker_side().map(|team| self.team_label(team))
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, SnapshotError> {
    let text = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| SnapshotError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a series snapshot (the body of `GET /series/{id}/`) from disk.
pub fn load_snapshot(path: &Path) -> Result<Series, SnapshotError> {
    load_json(path)
}

/// Load the map/mode catalog from disk.
pub fn load_catalog(path: &Path) -> Result<Catalog, SnapshotError> {
    load_json(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionType;
    use crate::exclusions::Exclusions;
    use crate::normalize::MapId;
    use serde_json::json;

    #[test]
    fn format_parsing() {
        assert_eq!(SeriesFormat::parse("Bo7"), Some(SeriesFormat::Bo7));
        assert_eq!(SeriesFormat::parse("BO5"), Some(SeriesFormat::Bo5));
        assert_eq!(SeriesFormat::parse(" bo3 "), Some(SeriesFormat::Bo3));
        assert_eq!(SeriesFormat::parse("Bo9"), None);
        assert_eq!(SeriesFormat::Bo7.games(), 7);
        assert_eq!(SeriesFormat::Bo5.to_string(), "Bo5");
    }

    #[test]
    fn ban_counts_and_game_order() {
        assert_eq!(SeriesFormat::Bo7.objective_bans(), 5);
        assert_eq!(SeriesFormat::Bo7.slayer_bans(), 2);
        assert_eq!(SeriesFormat::Bo5.objective_bans(), 3);
        assert_eq!(SeriesFormat::Bo5.slayer_bans(), 2);

        let bo7: Vec<(Track, Team)> = SeriesFormat::Bo7
            .game_slots()
            .iter()
            .map(|s| (s.track, s.picker))
            .collect();
        assert_eq!(
            bo7,
            vec![
                (Track::Objective, Team::B),
                (Track::Slayer, Team::A),
                (Track::Objective, Team::B),
                (Track::Objective, Team::A),
                (Track::Slayer, Team::B),
                (Track::Objective, Team::A),
                (Track::Slayer, Team::B),
            ]
        );
        assert_eq!(SeriesFormat::Bo3.game_slots().len(), 3);
        assert_eq!(
            SeriesFormat::Bo5.game_slot(5).map(|s| s.track),
            Some(Track::Slayer)
        );
        assert_eq!(SeriesFormat::Bo5.game_slot(6), None);
    }

    #[test]
    fn odd_shaped_fields_do_not_fail_the_snapshot() {
        let series: Series = serde_json::from_value(json!({
            "id": "41",
            "team_a": { "id": 3, "name": "Optic" },
            "team_b": 9,
            "series_type": 7,
            "turn": { "action": "SKIP" },
            "actions": [
                { "action_type": "PICK", "map_id": 1, "mode_id": 2, "team": 12, "game": "2" },
                { "action_type": "BAN", "map_id": 4, "kind": "SLAYER_MAP", "team": "A" },
                "garbage",
                { "map_id": 5 }
            ]
        }))
        .expect("lenient snapshot");

        assert_eq!(series.id, None);
        assert_eq!(series.team_a.as_deref(), Some("Optic"));
        assert_eq!(series.team_b.as_deref(), Some("9"));
        assert_eq!(series.format(), None);
        assert_eq!(series.turn, None);
        assert_eq!(series.actions.len(), 4);
        assert_eq!(series.actions[0].team, None);
        assert_eq!(series.actions[0].game_number(), Some(2));
        assert_eq!(series.actions[2].action_type, ActionType::Other);
        assert_eq!(series.actions[3].action_type, ActionType::Other);

        // The numeric-team pick and its neighbours still fold.
        let ex = Exclusions::from_actions(&series.actions);
        assert!(ex.is_map_picked(MapId(1)));
        assert!(ex.is_slayer_map_banned(MapId(4)));
        assert!(!ex.is_map_picked(MapId(5)));
    }

    #[test]
    fn deserializes_api_snapshot() {
        let series: Series = serde_json::from_value(json!({
            "id": 12,
            "team_a": "Optic",
            "team_b": "Cloud9",
            "series_type": "Bo7",
            "status": "IN_PROGRESS",
            "turn": { "action": "BAN", "kind": "SLAYER_MAP", "team": "B" },
            "actions": [
                { "action_type": "BAN", "team": "A", "map_id": 1, "mode_id": 2, "kind": "OBJECTIVE_COMBO" }
            ],
            "created_by": "ignored"
        }))
        .unwrap();
        assert_eq!(series.id, Some(12));
        assert_eq!(series.format(), Some(SeriesFormat::Bo7));
        assert_eq!(series.actions.len(), 1);
        assert_eq!(series.turn.as_ref().map(|t| t.track()), Some(Track::Slayer));
        assert_eq!(series.current_picker_side(), Some(Team::B));
        assert_eq!(series.current_picker_label().as_deref(), Some("Cloud9"));
    }

    #[test]
    fn type_alias_and_missing_fields() {
        let series: Series =
            serde_json::from_value(json!({ "type": "Bo5", "team_a": null })).unwrap();
        assert_eq!(series.format(), Some(SeriesFormat::Bo5));
        assert!(series.actions.is_empty());
        assert_eq!(series.current_picker_label(), None);
        assert_eq!(series.team_label(Team::A), "Team A");
    }

    #[test]
    fn load_snapshot_reports_path_on_error() {
        let missing = Path::new("does/not/exist.json");
        let err = load_snapshot(missing).unwrap_err();
        assert!(matches!(err, SnapshotError::Io { .. }));
        assert!(err.to_string().contains("does/not/exist.json"));
    }
}
