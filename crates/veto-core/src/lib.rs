// Ban/pick reconciliation engine for map/mode veto drafts.
//
// Takes the raw action log of a series and derives which map/mode combos
// are still selectable. Everything here is pure and synchronous; fetching
// the log and rendering the choices belong to the callers.

pub mod action;
pub mod candidates;
pub mod classify;
pub mod exclusions;
pub mod generate;
pub mod layout;
mod lenient;
pub mod normalize;
pub mod observe;
pub mod series;

pub use action::{Action, ActionType, KindTag, Team};
pub use classify::{Classifier, Track, SLAYER_MODE_ID};
pub use exclusions::{ExclusionCache, Exclusions};
pub use normalize::{normalize, MapId, ModeId, NormalizedRef};
