//! Per-player aggregates built from finalized and in-progress rallies.

use std::collections::BTreeMap;

use crate::engine::inference::resolve_receive_quality_before_set;
use crate::engine::roster::{SideLookup, SideMap};
use crate::engine::scoring::{performance_score, set_success};
use crate::engine::{Clock, LeadState, MatchPhase, Scorebook};
use crate::models::{Action, ActionKind, Quality, SetCallType};

/// Running mean of performance scores.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScoreStats {
    pub attempts: u32,
    pub total: f64,
}

impl ScoreStats {
    pub fn push(&mut self, value: f64) {
        self.attempts += 1;
        self.total += value;
    }

    pub fn mean(&self) -> Option<f64> {
        (self.attempts > 0).then(|| self.total / self.attempts as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct KindStats {
    pub attempts: u32,
    /// Scored attempts only; sets have no scoring table.
    pub score: ScoreStats,
    pub results: BTreeMap<&'static str, u32>,
}

impl KindStats {
    pub fn count(&self, result: &str) -> u32 {
        self.results.get(result).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerReport {
    pub player_id: String,
    pub matches_played: u32,
    pub by_kind: BTreeMap<ActionKind, KindStats>,
    /// Attack performance keyed by the set call that fed it (`None` = untagged).
    pub attack_by_origin: BTreeMap<Option<SetCallType>, ScoreStats>,
    pub by_lead: BTreeMap<LeadState, ScoreStats>,
    pub by_phase: BTreeMap<MatchPhase, ScoreStats>,
    /// Set success keyed by the quality of the pass that preceded it.
    pub set_by_pass_quality: BTreeMap<Option<Quality>, ScoreStats>,
}

impl PlayerReport {
    pub fn kind(&self, kind: ActionKind) -> Option<&KindStats> {
        self.by_kind.get(&kind)
    }

    pub fn total_actions(&self) -> u32 {
        self.by_kind.values().map(|k| k.attempts).sum()
    }
}

/// Aggregate everything `player_id` did across the scorebook.
///
/// Context splits (lead, phase, pass quality) need the player's side, which
/// is taken from each match's current roster; actions of players no longer
/// on a roster only count toward the per-kind totals.
pub fn player_report<C: Clock>(book: &Scorebook<C>, player_id: &str) -> PlayerReport {
    let mut report = PlayerReport { player_id: player_id.to_string(), ..Default::default() };

    for log in book.match_logs() {
        let sides = SideMap::from_roster(log.roster());
        let side = sides.side_of(player_id);
        let mut played = false;

        for entry in log.timeline() {
            let actions = entry.rally.actions();
            for (index, record) in actions.iter().enumerate() {
                if record.actor_id != player_id {
                    continue;
                }
                played = true;

                let action = &record.action;
                let stats = report.by_kind.entry(action.kind()).or_default();
                stats.attempts += 1;
                *stats.results.entry(action.result_str()).or_default() += 1;

                let value = performance_score(action);
                if let Some(value) = value {
                    stats.score.push(value);
                }

                if let Action::Attack { origin_tag, .. } = action {
                    if let Some(value) = value {
                        report.attack_by_origin.entry(*origin_tag).or_default().push(value);
                    }
                }

                let Some(side) = side else { continue };

                if let Some(value) = value {
                    report.by_lead.entry(entry.lead_state(side)).or_default().push(value);
                    report.by_phase.entry(entry.phase()).or_default().push(value);
                }

                if let Action::Set(result) = action {
                    let pass = resolve_receive_quality_before_set(actions, index, side, &sides);
                    report.set_by_pass_quality.entry(pass).or_default().push(set_success(*result));
                }
            }
        }

        if played {
            report.matches_played += 1;
        }
    }

    report
}
