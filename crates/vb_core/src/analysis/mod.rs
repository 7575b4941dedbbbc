//! Read-only analytics over recorded matches.

pub mod report;

pub use report::{player_report, KindStats, PlayerReport, ScoreStats};

use crate::engine::{MatchLog, Score};

/// Headline numbers for a match list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSummary {
    pub match_id: String,
    pub date: String,
    pub finalized_rallies: usize,
    pub score: Score,
}

pub fn summarize_match(log: &MatchLog) -> MatchSummary {
    MatchSummary {
        match_id: log.id().to_string(),
        date: log.info().date.clone(),
        finalized_rallies: log.history().iter().filter(|r| r.outcome().is_some()).count(),
        score: log.score(),
    }
}

/// Rounded percentage for display; `"0%"` when there is nothing to divide by.
pub fn pct(n: u32, d: u32) -> String {
    if d == 0 {
        return "0%".to_string();
    }
    format!("{}%", (f64::from(n) / f64::from(d) * 100.0).round() as u32)
}
