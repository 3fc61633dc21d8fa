// Random series generator: a complete, valid ban/pick log for a format,
// drawn from a catalog. Used for demos and for exercising the fold.

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use tracing::debug;

use crate::action::{Action, Team, KIND_OBJECTIVE_COMBO, KIND_SLAYER_MAP};
use crate::candidates::{
    available_objective_combos, available_slayer_maps, slayer_candidates, ComboEntry, TurnAction,
    TurnDescriptor,
};
use crate::classify::{Classifier, Track};
use crate::exclusions::Exclusions;
use crate::layout::Catalog;
use crate::normalize::ModeId;
use crate::observe::NoopObserver;
use crate::series::{Series, SeriesFormat};

pub const STATUS_IN_PROGRESS: &str = "IN_PROGRESS";
pub const STATUS_COMPLETED: &str = "COMPLETED";

/// Sides alternate, starting with A.
fn side(turn: usize) -> Team {
    if turn % 2 == 0 {
        Team::A
    } else {
        Team::B
    }
}

fn objective_action(base: Action, mode: &str, mode_id: ModeId, combo: &ComboEntry) -> Action {
    base.with_field("kind", KIND_OBJECTIVE_COMBO)
        .with_field("map_id", combo.map_id.0)
        .with_field("map_name", combo.map.as_str())
        .with_field("mode_id", mode_id.0)
        .with_field("mode_name", mode)
}

fn slayer_action(base: Action, slayer_mode_id: ModeId, combo: &ComboEntry) -> Action {
    base.with_field("kind", KIND_SLAYER_MAP)
        .with_field("map_id", combo.map_id.0)
        .with_field("map_name", combo.map.as_str())
        .with_field("mode_id", slayer_mode_id.0)
        .with_field("mode_name", "Slayer")
}

/// Generate a series of `format` with the full ban phase and up to `picks`
/// games picked in slot order.
///
/// Every ban and pick is drawn from what is still available at that point,
/// so the log never bans a combo twice or picks a map twice. The ban phase
/// is cut short, and picking stops early, when the catalog runs out of
/// candidates.
pub fn random_series<R>(
    format: SeriesFormat,
    catalog: &Catalog,
    classifier: &Classifier,
    picks: usize,
    rng: &mut R,
) -> Series
where
    R: Rng + ?Sized,
{
    let mut actions = Vec::new();

    let mut objective_pool: Vec<(&str, ModeId, &ComboEntry)> = catalog
        .grouped
        .objective
        .iter()
        .flat_map(|g| g.combos.iter().map(move |c| (g.mode.as_str(), g.mode_id, c)))
        .collect();
    objective_pool.shuffle(rng);
    for (turn, (mode, mode_id, combo)) in objective_pool
        .into_iter()
        .take(format.objective_bans())
        .enumerate()
    {
        let ban = Action::ban().with_team(side(turn));
        actions.push(objective_action(ban, mode, mode_id, combo));
    }

    let mut slayer_pool = slayer_candidates(&catalog.grouped, &catalog.maps);
    slayer_pool.shuffle(rng);
    let offset = actions.len();
    for (turn, combo) in slayer_pool.iter().take(format.slayer_bans()).enumerate() {
        let ban = Action::ban().with_team(side(offset + turn));
        actions.push(slayer_action(ban, classifier.slayer_mode_id, combo));
    }

    let mut picked = 0;
    for slot in format.game_slots().iter().take(picks) {
        let ex = Exclusions::fold(&actions, classifier, &NoopObserver);
        let pick = Action::pick().with_team(slot.picker).with_game(slot.game);
        let action = match slot.track {
            Track::Objective => {
                let open = available_objective_combos(&catalog.grouped.objective, &ex);
                let choices: Vec<(&str, ModeId, &ComboEntry)> = open
                    .iter()
                    .flat_map(|g| g.combos.iter().map(move |c| (g.mode.as_str(), g.mode_id, c)))
                    .collect();
                choices
                    .choose(rng)
                    .map(|&(mode, mode_id, combo)| objective_action(pick, mode, mode_id, combo))
            }
            Track::Slayer => available_slayer_maps(&catalog.grouped, &catalog.maps, &ex)
                .choose(rng)
                .map(|combo| slayer_action(pick, classifier.slayer_mode_id, combo)),
        };
        let Some(action) = action else {
            debug!(game = slot.game, track = slot.track.label(), "no candidates left");
            break;
        };
        actions.push(action);
        picked += 1;
    }

    let next = format.game_slots().get(picked);
    debug!(
        format = %format,
        actions = actions.len(),
        picked,
        "generated random series"
    );

    Series {
        id: None,
        team_a: Some("Team A".to_string()),
        team_b: Some("Team B".to_string()),
        series_type: Some(format.to_string()),
        status: Some(
            if next.is_some() {
                STATUS_IN_PROGRESS
            } else {
                STATUS_COMPLETED
            }
            .to_string(),
        ),
        turn: next.map(|slot| TurnDescriptor::new(TurnAction::Pick, slot.track, slot.picker)),
        actions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::SeriesLayout;
    use crate::observe::{FoldEvent, RecordingObserver};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn catalog() -> Catalog {
        let names = [
            "Aquarius", "Live Fire", "Streets", "Recharge", "Catalyst", "Solitude", "Fortress",
            "Origin", "Lattice",
        ];
        let combos: Vec<_> = names
            .iter()
            .enumerate()
            .map(|(i, name)| json!({ "map_id": i + 1, "map": name }))
            .collect();
        let modes = [
            (1, "Capture the Flag"),
            (2, "Strongholds"),
            (3, "Oddball"),
            (4, "King of the Hill"),
            (5, "Neutral Bomb"),
        ];
        let objective: Vec<_> = modes
            .iter()
            .map(|(id, name)| json!({ "mode": name, "mode_id": id, "combos": combos }))
            .collect();
        serde_json::from_value(json!({
            "grouped": {
                "objective": objective,
                "slayer": [{ "mode": "Slayer", "mode_id": 6, "combos": combos }]
            }
        }))
        .unwrap()
    }

    #[test]
    fn bo7_log_folds_cleanly() {
        let mut rng = StdRng::seed_from_u64(7);
        let classifier = Classifier::default();
        let series = random_series(SeriesFormat::Bo7, &catalog(), &classifier, 4, &mut rng);

        assert_eq!(series.format(), Some(SeriesFormat::Bo7));
        assert_eq!(series.actions.len(), 5 + 2 + 4);

        let observer = RecordingObserver::new();
        let ex = Exclusions::fold(&series.actions, &classifier, &observer);
        // Every action is recorded; nothing is skipped or reinterpreted.
        let events = observer.events();
        assert_eq!(events.len(), series.actions.len());
        assert!(events.iter().all(|e| matches!(e, FoldEvent::Recorded { .. })));

        assert_eq!(ex.banned_combinations.len(), 5);
        assert_eq!(ex.slayer_banned_map_ids.len(), 2);
        assert_eq!(ex.picked_map_ids.len(), 4);
        for (map, mode) in &ex.picked_combinations {
            assert!(!ex.banned_combinations.contains(&(*map, *mode)));
        }
        for map in &ex.slayer_picked_map_ids {
            assert!(!ex.slayer_banned_map_ids.contains(map));
        }
    }

    #[test]
    fn picks_follow_the_game_order() {
        let mut rng = StdRng::seed_from_u64(11);
        let classifier = Classifier::default();
        let series = random_series(SeriesFormat::Bo5, &catalog(), &classifier, 3, &mut rng);
        let layout = SeriesLayout::build(&series, &catalog(), &classifier);

        assert_eq!(layout.objective_bans.len(), 3);
        assert_eq!(layout.slayer_bans.len(), 2);
        for game in layout.games.iter().take(3) {
            let pick = game.pick.as_ref().expect("picked");
            assert_eq!(pick.track, game.track);
            assert_eq!(pick.team, game.picker);
        }
        assert_eq!(layout.remaining_games(), Some(2));

        let turn = series.turn.expect("game 4 pending");
        assert_eq!(turn.track(), Track::Objective);
        assert_eq!(turn.team, Some(Team::A));
        assert_eq!(series.status.as_deref(), Some(STATUS_IN_PROGRESS));
    }

    #[test]
    fn full_series_is_completed() {
        let mut rng = StdRng::seed_from_u64(3);
        let series = random_series(
            SeriesFormat::Bo3,
            &catalog(),
            &Classifier::default(),
            10,
            &mut rng,
        );
        assert_eq!(series.turn, None);
        assert_eq!(series.status.as_deref(), Some(STATUS_COMPLETED));
        assert_eq!(series.actions.len(), 3 + 2 + 3);
    }

    #[test]
    fn small_catalog_stops_early() {
        let tiny: Catalog = serde_json::from_value(json!({
            "grouped": {
                "objective": [{ "mode": "Oddball", "mode_id": 3, "combos": [{ "map_id": 1, "map": "Aquarius" }] }],
                "slayer": [{ "mode": "Slayer", "mode_id": 6, "combos": [{ "map_id": 2, "map": "Streets" }] }]
            }
        }))
        .unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let series = random_series(SeriesFormat::Bo7, &tiny, &Classifier::default(), 7, &mut rng);
        // One objective ban and one slayer ban use up both pools.
        assert_eq!(series.actions.len(), 2);
        assert_eq!(series.turn.map(|t| t.track()), Some(Track::Objective));
    }
}
