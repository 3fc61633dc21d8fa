// Exclusion sets derived from the action log, and the availability queries
// over them.
//
// `Exclusions` is always rebuilt from the whole log. There is no incremental
// update path; `ExclusionCache` only skips the rebuild when it is handed the
// very same shared log again.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;

use crate::action::{Action, ActionType};
use crate::classify::{Classifier, Track};
use crate::normalize::{MapId, ModeId};
use crate::observe::{FoldEvent, FoldObserver, NoopObserver, SkipReason};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Exclusions {
    /// `(map, mode)` pairs banned on the objective track.
    pub banned_combinations: BTreeSet<(MapId, ModeId)>,
    /// Maps banned on the slayer track.
    pub slayer_banned_map_ids: BTreeSet<MapId>,
    /// `(map, mode)` pairs picked on the objective track.
    pub picked_combinations: BTreeSet<(MapId, ModeId)>,
    /// Maps picked on the slayer track.
    pub slayer_picked_map_ids: BTreeSet<MapId>,
    /// Maps picked on the objective track, with or without a known mode.
    pub objective_picked_map_ids: BTreeSet<MapId>,
    /// Maps picked on either track.
    pub picked_map_ids: BTreeSet<MapId>,
    /// The policy the sets were folded under; queries use the same
    /// reserved Slayer id.
    #[serde(skip)]
    classifier: Classifier,
}

impl Exclusions {
    /// Fold a log with the default policy and no observer.
    pub fn from_actions(actions: &[Action]) -> Self {
        Self::fold(actions, &Classifier::default(), &NoopObserver)
    }

    /// Fold a log into fresh exclusion sets.
    pub fn fold(actions: &[Action], classifier: &Classifier, observer: &dyn FoldObserver) -> Self {
        let mut ex = Exclusions {
            classifier: *classifier,
            ..Exclusions::default()
        };

        for (index, action) in actions.iter().enumerate() {
            let Some((classified, classification)) = classifier.classify_action(index, action)
            else {
                let reason = if action.action_type == ActionType::Other {
                    SkipReason::NotBanOrPick
                } else {
                    SkipReason::NoMap
                };
                observer.on_event(&FoldEvent::Skipped { index, reason });
                continue;
            };

            let map_id = classified.map_id;
            let mode_id = classified.mode_id;

            if classification.tag_overrode_mode {
                if let Some(mode_id) = mode_id {
                    observer.on_event(&FoldEvent::TagOverride {
                        index,
                        map_id,
                        mode_id,
                    });
                }
            }

            match (classified.action_type, classified.track) {
                (ActionType::Ban, Track::Slayer) => {
                    ex.slayer_banned_map_ids.insert(map_id);
                }
                (ActionType::Ban, Track::Objective) => {
                    if let Some(mode_id) = mode_id {
                        ex.banned_combinations.insert((map_id, mode_id));
                    }
                }
                (ActionType::Pick, track) => {
                    ex.picked_map_ids.insert(map_id);
                    match track {
                        Track::Slayer => {
                            ex.slayer_picked_map_ids.insert(map_id);
                        }
                        Track::Objective => {
                            ex.objective_picked_map_ids.insert(map_id);
                            if let Some(mode_id) = mode_id {
                                ex.picked_combinations.insert((map_id, mode_id));
                            }
                        }
                    }
                }
                (ActionType::Other, _) => continue,
            }

            if classified.track == Track::Objective && mode_id.is_none() {
                observer.on_event(&FoldEvent::ModeDropped {
                    index,
                    action_type: classified.action_type,
                    map_id,
                });
            } else {
                observer.on_event(&FoldEvent::Recorded {
                    index,
                    action_type: classified.action_type,
                    track: classified.track,
                    map_id,
                    mode_id,
                });
            }
        }

        ex
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Banned on the objective track, or a Slayer query for a slayer-banned
    /// map.
    pub fn is_combo_banned(&self, map_id: MapId, mode_id: ModeId) -> bool {
        self.banned_combinations.contains(&(map_id, mode_id))
            || (self.classifier.is_slayer_mode(mode_id)
                && self.slayer_banned_map_ids.contains(&map_id))
    }

    /// Picked as this exact combo, consumed by any objective pick, or a
    /// Slayer query for a slayer-picked map.
    pub fn is_combo_picked(&self, map_id: MapId, mode_id: ModeId) -> bool {
        self.picked_combinations.contains(&(map_id, mode_id))
            || self.objective_picked_map_ids.contains(&map_id)
            || (self.classifier.is_slayer_mode(mode_id)
                && self.slayer_picked_map_ids.contains(&map_id))
    }

    pub fn is_available(&self, map_id: MapId, mode_id: ModeId) -> bool {
        !self.is_combo_banned(map_id, mode_id) && !self.is_combo_picked(map_id, mode_id)
    }

    /// Picked on either track.
    pub fn is_map_picked(&self, map_id: MapId) -> bool {
        self.picked_map_ids.contains(&map_id)
    }

    pub fn is_slayer_map_banned(&self, map_id: MapId) -> bool {
        self.slayer_banned_map_ids.contains(&map_id)
    }

    pub fn is_slayer_map_picked(&self, map_id: MapId) -> bool {
        self.slayer_picked_map_ids.contains(&map_id)
    }

    /// A map can still be banned or picked for Slayer when it is not
    /// slayer-banned and no pick of any kind has consumed it.
    pub fn is_slayer_map_available(&self, map_id: MapId) -> bool {
        !self.is_slayer_map_banned(map_id) && !self.is_map_picked(map_id)
    }

    pub fn is_empty(&self) -> bool {
        self.banned_combinations.is_empty()
            && self.slayer_banned_map_ids.is_empty()
            && self.picked_map_ids.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Identity-keyed memo
// ---------------------------------------------------------------------------

/// Remembers the exclusions for the last shared log it saw.
///
/// The key is the `Arc` allocation, so a log that is rebuilt (even with equal
/// contents) is folded again. Holding the `Arc` keeps the allocation alive,
/// which makes pointer equality a sound identity check.
#[derive(Debug, Default)]
pub struct ExclusionCache {
    classifier: Classifier,
    entry: Option<(Arc<[Action]>, Exclusions)>,
}

impl ExclusionCache {
    pub fn new(classifier: Classifier) -> Self {
        ExclusionCache {
            classifier,
            entry: None,
        }
    }

    pub fn get(&mut self, log: &Arc<[Action]>, observer: &dyn FoldObserver) -> &Exclusions {
        let hit = matches!(&self.entry, Some((cached, _)) if Arc::ptr_eq(cached, log));
        if !hit {
            self.entry = None;
        }
        let classifier = self.classifier;
        let (_, exclusions) = self
            .entry
            .get_or_insert_with(|| (Arc::clone(log), Exclusions::fold(log, &classifier, observer)));
        exclusions
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }
}
