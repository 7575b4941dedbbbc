//! Running score over a match's rallies, plus per-rally context.

use serde::{Deserialize, Serialize};

use crate::models::{RallyLog, TeamSide};

/// Total points (home + away) below which a rally counts as early.
pub const EARLY_PHASE_LIMIT: u32 = 10;
/// Total points below which a rally counts as mid (and otherwise late).
pub const MID_PHASE_LIMIT: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

impl Score {
    pub fn new(home: u32, away: u32) -> Self {
        Self { home, away }
    }

    pub fn of(&self, side: TeamSide) -> u32 {
        match side {
            TeamSide::Home => self.home,
            TeamSide::Away => self.away,
        }
    }

    pub fn total(&self) -> u32 {
        self.home + self.away
    }

    /// Score with one more point for `side`.
    pub fn with_point(self, side: TeamSide) -> Self {
        match side {
            TeamSide::Home => Self { home: self.home + 1, ..self },
            TeamSide::Away => Self { away: self.away + 1, ..self },
        }
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.home, self.away)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadState {
    Lead,
    Tie,
    Behind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    Early,
    Mid,
    Late,
}

/// One rally with the score on either side of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineEntry<'a> {
    pub rally: &'a RallyLog,
    pub score_before: Score,
    pub score_after: Score,
}

impl TimelineEntry<'_> {
    pub fn lead_state(&self, side: TeamSide) -> LeadState {
        lead_state(side, self.score_before)
    }

    pub fn phase(&self) -> MatchPhase {
        match_phase(self.score_before)
    }
}

/// Fold rallies into a running score.
///
/// Rallies are ordered by `created_at`; equal timestamps keep their input
/// order. Open rallies appear in the output with an unchanged score.
pub fn build(rallies: &[RallyLog]) -> Vec<TimelineEntry<'_>> {
    let mut ordered: Vec<&RallyLog> = rallies.iter().collect();
    ordered.sort_by_key(|rally| rally.created_at);
    build_ordered(ordered)
}

/// Fold rallies that are already in timeline order.
pub fn build_ordered<'a>(rallies: impl IntoIterator<Item = &'a RallyLog>) -> Vec<TimelineEntry<'a>> {
    let mut score = Score::default();
    rallies
        .into_iter()
        .map(|rally| {
            let score_before = score;
            if let Some(side) = rally.outcome() {
                score = score.with_point(side);
            }
            TimelineEntry { rally, score_before, score_after: score }
        })
        .collect()
}

/// Where `side` stood before the rally started.
pub fn lead_state(side: TeamSide, score_before: Score) -> LeadState {
    let own = score_before.of(side);
    let other = score_before.of(side.opponent());
    match own.cmp(&other) {
        std::cmp::Ordering::Greater => LeadState::Lead,
        std::cmp::Ordering::Less => LeadState::Behind,
        std::cmp::Ordering::Equal => LeadState::Tie,
    }
}

pub fn match_phase(score_before: Score) -> MatchPhase {
    let total = score_before.total();
    if total < EARLY_PHASE_LIMIT {
        MatchPhase::Early
    } else if total < MID_PHASE_LIMIT {
        MatchPhase::Mid
    } else {
        MatchPhase::Late
    }
}

/// Score after the last rally.
pub fn final_score(timeline: &[TimelineEntry<'_>]) -> Score {
    timeline.last().map(|entry| entry.score_after).unwrap_or_default()
}
