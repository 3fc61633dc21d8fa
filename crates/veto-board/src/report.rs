// Availability report for one series snapshot: who is on turn, what can
// still be chosen, what is gone and why, and the draft so far.

use std::fmt;

use serde::Serialize;
use tracing::info;

use veto_core::candidates::{
    available_for_turn, combo_status, slayer_candidates, slayer_map_status, CandidateStatus,
    TurnOptions,
};
use veto_core::layout::{Catalog, LayoutEntry, SeriesLayout};
use veto_core::observe::TracingObserver;
use veto_core::series::{Series, SeriesFormat};
use veto_core::{Classifier, Exclusions, Team, Track};

use crate::config::ReportConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnSummary {
    pub team_label: String,
    pub action: String,
    pub track: Track,
}

/// A candidate that can no longer be chosen on the current turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExcludedCandidate {
    pub map: String,
    pub mode: String,
    pub status: CandidateStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub series_id: Option<u64>,
    pub matchup: String,
    pub format: Option<SeriesFormat>,
    pub status: Option<String>,
    pub turn: Option<TurnSummary>,
    pub exclusions: Exclusions,
    pub options: Option<TurnOptions>,
    pub excluded: Vec<ExcludedCandidate>,
    pub layout: Option<SeriesLayout>,
}

impl Report {
    pub fn build(
        series: &Series,
        catalog: &Catalog,
        classifier: &Classifier,
        settings: &ReportConfig,
    ) -> Self {
        let exclusions = Exclusions::fold(&series.actions, classifier, &TracingObserver);

        let turn = series.turn.as_ref().map(|t| TurnSummary {
            team_label: series.current_picker_label().unwrap_or_default(),
            action: t.action.as_str().to_string(),
            track: t.track(),
        });

        let options = series
            .turn
            .as_ref()
            .map(|t| available_for_turn(t, &catalog.grouped, &catalog.maps, &exclusions));

        let excluded = match (&turn, settings.show_excluded) {
            (Some(t), true) => excluded_candidates(t.track, catalog, &exclusions),
            _ => Vec::new(),
        };

        let layout = settings
            .show_layout
            .then(|| SeriesLayout::build(series, catalog, classifier));

        info!(
            actions = series.actions.len(),
            options = options.as_ref().map(TurnOptions::len),
            excluded = excluded.len(),
            "built availability report"
        );

        Report {
            series_id: series.id,
            matchup: format!(
                "{} vs {}",
                series.team_label(Team::A),
                series.team_label(Team::B)
            ),
            format: series.format(),
            status: series.status.clone(),
            turn,
            exclusions,
            options,
            excluded,
            layout,
        }
    }
}

fn excluded_candidates(track: Track, catalog: &Catalog, exclusions: &Exclusions) -> Vec<ExcludedCandidate> {
    match track {
        Track::Objective => catalog
            .grouped
            .objective
            .iter()
            .flat_map(|group| {
                group.combos.iter().filter_map(move |combo| {
                    let status = combo_status(exclusions, combo.map_id, group.mode_id);
                    (status != CandidateStatus::Available).then(|| ExcludedCandidate {
                        map: combo.map.clone(),
                        mode: group.mode.clone(),
                        status,
                    })
                })
            })
            .collect(),
        Track::Slayer => slayer_candidates(&catalog.grouped, &catalog.maps)
            .into_iter()
            .filter_map(|c| {
                let status = slayer_map_status(exclusions, c.map_id);
                (status != CandidateStatus::Available).then(|| ExcludedCandidate {
                    map: c.map,
                    mode: "Slayer".to_string(),
                    status,
                })
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Text rendering
// ---------------------------------------------------------------------------

fn status_label(status: CandidateStatus) -> &'static str {
    match status {
        CandidateStatus::Available => "available",
        CandidateStatus::Banned => "banned",
        CandidateStatus::Picked => "picked",
    }
}

fn write_entry(f: &mut fmt::Formatter<'_>, prefix: &str, entry: &LayoutEntry) -> fmt::Result {
    let team = if entry.team_label.is_empty() {
        "-"
    } else {
        entry.team_label.as_str()
    };
    writeln!(f, "  {prefix}{team:<12} {} - {}", entry.map, entry.mode)
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.series_id {
            Some(id) => write!(f, "Series {id}: {}", self.matchup)?,
            None => write!(f, "Series: {}", self.matchup)?,
        }
        let mut details = Vec::new();
        if let Some(format) = self.format {
            details.push(format.to_string());
        }
        if let Some(status) = &self.status {
            details.push(status.clone());
        }
        if details.is_empty() {
            writeln!(f)?;
        } else {
            writeln!(f, " ({})", details.join(", "))?;
        }

        match &self.turn {
            Some(turn) => {
                let who = if turn.team_label.is_empty() {
                    "Unknown team"
                } else {
                    turn.team_label.as_str()
                };
                writeln!(f, "On turn: {who} to {} ({})", turn.action, turn.track.label())?;
            }
            None => writeln!(f, "No turn pending")?,
        }

        if let Some(layout) = &self.layout {
            writeln!(f)?;
            let quota = |made: usize, allowed: Option<usize>| match allowed {
                Some(allowed) => format!("{made} of {allowed}"),
                None => made.to_string(),
            };
            writeln!(
                f,
                "Objective bans ({}):",
                quota(layout.objective_bans.len(), layout.format.map(|fm| fm.objective_bans()))
            )?;
            for entry in &layout.objective_bans {
                write_entry(f, "", entry)?;
            }
            writeln!(
                f,
                "Slayer bans ({}):",
                quota(layout.slayer_bans.len(), layout.format.map(|fm| fm.slayer_bans()))
            )?;
            for entry in &layout.slayer_bans {
                write_entry(f, "", entry)?;
            }
            writeln!(f, "Games:")?;
            for game in &layout.games {
                let prefix = format!("{}. ", game.game);
                match &game.pick {
                    Some(pick) => write_entry(f, &prefix, pick)?,
                    None => {
                        let picker = if game.picker_label.is_empty() {
                            "-"
                        } else {
                            game.picker_label.as_str()
                        };
                        writeln!(f, "  {prefix}{picker:<12} open ({})", game.track.label())?;
                    }
                }
            }
            if let Some(remaining) = layout.remaining_games() {
                writeln!(f, "  ({remaining} remaining)")?;
            }
        }

        if let Some(options) = &self.options {
            writeln!(f)?;
            match options {
                TurnOptions::Objective(groups) => {
                    writeln!(f, "Available objective combos ({}):", options.len())?;
                    for group in groups {
                        let maps: Vec<&str> = group.combos.iter().map(|c| c.map.as_str()).collect();
                        writeln!(f, "  {}: {}", group.mode, maps.join(", "))?;
                    }
                }
                TurnOptions::Slayer(maps) => {
                    writeln!(f, "Available slayer maps ({}):", maps.len())?;
                    for map in maps {
                        writeln!(f, "  {}", map.map)?;
                    }
                }
            }
            if options.is_empty() {
                writeln!(f, "  (none)")?;
            }
        }

        if !self.excluded.is_empty() {
            writeln!(f, "Excluded:")?;
            for candidate in &self.excluded {
                writeln!(
                    f,
                    "  {} - {} ({})",
                    candidate.map,
                    candidate.mode,
                    status_label(candidate.status)
                )?;
            }
        }

        Ok(())
    }
}
