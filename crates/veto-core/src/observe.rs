// Observability hook for the exclusion fold.
//
// The fold reports what it did with each log entry through a `FoldObserver`.
// Observers only watch: the computed exclusions are identical whichever
// observer is passed.

use std::cell::RefCell;

use tracing::{debug, warn};

use crate::action::ActionType;
use crate::classify::Track;
use crate::normalize::{MapId, ModeId};

/// Why a log entry contributed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No resolvable map id.
    NoMap,
    /// Neither a ban nor a pick.
    NotBanOrPick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldEvent {
    Skipped {
        index: usize,
        reason: SkipReason,
    },
    /// An objective tag was trusted over a mode id equal to the reserved
    /// Slayer id.
    TagOverride {
        index: usize,
        map_id: MapId,
        mode_id: ModeId,
    },
    /// Objective action without a resolvable mode: no combo recorded.
    ModeDropped {
        index: usize,
        action_type: ActionType,
        map_id: MapId,
    },
    Recorded {
        index: usize,
        action_type: ActionType,
        track: Track,
        map_id: MapId,
        mode_id: Option<ModeId>,
    },
}

pub trait FoldObserver {
    fn on_event(&self, event: &FoldEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl FoldObserver for NoopObserver {
    fn on_event(&self, _event: &FoldEvent) {}
}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl FoldObserver for TracingObserver {
    fn on_event(&self, event: &FoldEvent) {
        match *event {
            FoldEvent::Skipped { index, reason } => {
                debug!(index, ?reason, "skipping action");
            }
            FoldEvent::TagOverride {
                index,
                map_id,
                mode_id,
            } => {
                warn!(
                    index,
                    map_id = map_id.0,
                    mode_id = mode_id.0,
                    "objective tag on reserved Slayer mode id; trusting the tag"
                );
            }
            FoldEvent::ModeDropped {
                index,
                action_type,
                map_id,
            } => {
                warn!(
                    index,
                    %action_type,
                    map_id = map_id.0,
                    "objective action without a mode; no combo recorded"
                );
            }
            FoldEvent::Recorded {
                index,
                action_type,
                track,
                map_id,
                mode_id,
            } => {
                debug!(
                    index,
                    %action_type,
                    track = track.label(),
                    map_id = map_id.0,
                    mode_id = mode_id.map(|m| m.0),
                    "recorded action"
                );
            }
        }
    }
}

/// Keeps every event in order. Mostly useful in tests.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: RefCell<Vec<FoldEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<FoldEvent> {
        self.events.borrow().clone()
    }
}

impl FoldObserver for RecordingObserver {
    fn on_event(&self, event: &FoldEvent) {
        self.events.borrow_mut().push(*event);
    }
}
