// Track classification: objective combo vs. slayer map.
//
// Upstream data is inconsistent. Some actions carry an explicit `kind` tag,
// some only a mode id that may or may not be the reserved Slayer id, some
// neither. An explicit tag always wins over the numeric inference; a mode id
// of 6 on an OBJECTIVE_COMBO action is an objective action.

use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionType, KindTag, Team};
use crate::normalize::{normalize, MapId, ModeId};

/// Mode id the backend reserves for Slayer.
pub const SLAYER_MODE_ID: ModeId = ModeId(6);

/// Which exclusion track an action belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    /// Map+mode specific.
    Objective,
    /// Map only.
    Slayer,
}

impl Track {
    pub fn label(&self) -> &'static str {
        match self {
            Track::Objective => "Objective",
            Track::Slayer => "Slayer",
        }
    }
}

/// The rule that decided a classification, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    SlayerTag,
    ObjectiveTag,
    ReservedModeId,
    ObjectiveModeId,
    NoMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub track: Track,
    pub rule: Rule,
    /// True when an objective tag was trusted over a mode id equal to the
    /// reserved Slayer id.
    pub tag_overrode_mode: bool,
}

/// A resolvable action with its track and canonical ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedAction {
    /// Position in the action log.
    pub index: usize,
    pub action_type: ActionType,
    pub track: Track,
    pub map_id: MapId,
    pub mode_id: Option<ModeId>,
    pub team: Option<Team>,
}

/// Classification policy. The only knob is the reserved Slayer mode id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classifier {
    pub slayer_mode_id: ModeId,
}

impl Default for Classifier {
    fn default() -> Self {
        Classifier {
            slayer_mode_id: SLAYER_MODE_ID,
        }
    }
}

impl Classifier {
    pub fn new(slayer_mode_id: ModeId) -> Self {
        Classifier { slayer_mode_id }
    }

    /// Whether a mode id denotes Slayer under this policy.
    pub fn is_slayer_mode(&self, mode_id: ModeId) -> bool {
        mode_id == self.slayer_mode_id
    }

    /// Decide the track from an optional explicit tag and the normalized
    /// mode id.
    pub fn classify(&self, kind: Option<KindTag>, mode_id: Option<ModeId>) -> Classification {
        let reserved = mode_id.is_some_and(|m| self.is_slayer_mode(m));
        let (track, rule) = match (kind, mode_id) {
            (Some(KindTag::SlayerMap), _) => (Track::Slayer, Rule::SlayerTag),
            (Some(KindTag::Objective), _) => (Track::Objective, Rule::ObjectiveTag),
            (_, Some(_)) if reserved => (Track::Slayer, Rule::ReservedModeId),
            (_, Some(_)) => (Track::Objective, Rule::ObjectiveModeId),
            (_, None) => (Track::Slayer, Rule::NoMode),
        };
        Classification {
            track,
            rule,
            tag_overrode_mode: rule == Rule::ObjectiveTag && reserved,
        }
    }

    /// Normalize and classify one log entry. Returns `None` when the action
    /// is neither a ban nor a pick, or its map cannot be resolved.
    pub fn classify_action(
        &self,
        index: usize,
        action: &Action,
    ) -> Option<(ClassifiedAction, Classification)> {
        if action.action_type == ActionType::Other {
            return None;
        }
        let refs = normalize(action);
        let map_id = refs.map_id?;
        let classification = self.classify(action.kind(), refs.mode_id);
        Some((
            ClassifiedAction {
                index,
                action_type: action.action_type,
                track: classification.track,
                map_id,
                mode_id: refs.mode_id,
                team: action.team,
            },
            classification,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn track(kind: Option<KindTag>, mode: Option<u32>) -> Track {
        Classifier::default().classify(kind, mode.map(ModeId)).track
    }

    #[test]
    fn slayer_tag_always_slayer() {
        assert_eq!(track(Some(KindTag::SlayerMap), None), Track::Slayer);
        assert_eq!(track(Some(KindTag::SlayerMap), Some(2)), Track::Slayer);
        assert_eq!(track(Some(KindTag::SlayerMap), Some(6)), Track::Slayer);
    }

    #[test]
    fn objective_tag_beats_reserved_mode_id() {
        let c = Classifier::default().classify(Some(KindTag::Objective), Some(ModeId(6)));
        assert_eq!(c.track, Track::Objective);
        assert_eq!(c.rule, Rule::ObjectiveTag);
        assert!(c.tag_overrode_mode);
    }

    #[test]
    fn objective_tag_without_conflict() {
        let c = Classifier::default().classify(Some(KindTag::Objective), Some(ModeId(2)));
        assert_eq!(c.track, Track::Objective);
        assert!(!c.tag_overrode_mode);
        assert_eq!(track(Some(KindTag::Objective), None), Track::Objective);
    }

    #[test]
    fn mode_id_inference_without_tag() {
        assert_eq!(track(None, Some(6)), Track::Slayer);
        assert_eq!(track(None, Some(3)), Track::Objective);
        assert_eq!(track(None, None), Track::Slayer);
    }

    #[test]
    fn unrecognized_tag_falls_back_to_inference() {
        assert_eq!(track(Some(KindTag::Unrecognized), Some(6)), Track::Slayer);
        assert_eq!(track(Some(KindTag::Unrecognized), Some(1)), Track::Objective);
        assert_eq!(
            Classifier::default()
                .classify(Some(KindTag::Unrecognized), None)
                .rule,
            Rule::NoMode
        );
    }

    #[test]
    fn custom_reserved_id() {
        let classifier = Classifier::new(ModeId(9));
        assert_eq!(classifier.classify(None, Some(ModeId(9))).track, Track::Slayer);
        assert_eq!(classifier.classify(None, Some(ModeId(6))).track, Track::Objective);
    }

    #[test]
    fn classify_action_skips_unresolvable_map() {
        let action: Action =
            serde_json::from_value(json!({ "action_type": "BAN", "mode_id": 2 })).unwrap();
        assert!(Classifier::default().classify_action(0, &action).is_none());
    }

    #[test]
    fn classify_action_skips_other_types() {
        let action: Action =
            serde_json::from_value(json!({ "action_type": "RESET", "map_id": 2 })).unwrap();
        assert!(Classifier::default().classify_action(0, &action).is_none());
    }

    #[test]
    fn classify_action_carries_ids_and_team() {
        let action: Action = serde_json::from_value(json!({
            "action_type": "PICK",
            "team": "A",
            "map": { "id": 7 },
            "mode_id": 2,
            "kind": "OBJECTIVE_COMBO",
        }))
        .unwrap();
        let (classified, _) = Classifier::default().classify_action(4, &action).unwrap();
        assert_eq!(
            classified,
            ClassifiedAction {
                index: 4,
                action_type: ActionType::Pick,
                track: Track::Objective,
                map_id: MapId(7),
                mode_id: Some(ModeId(2)),
                team: Some(Team::A),
            }
        );
    }
}
