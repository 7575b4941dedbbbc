//! Per-match rally history with an explicit handle to the current rally.
//!
//! A `MatchLog` always holds exactly one open rally (`current`). Every
//! operation that finalizes it swaps in the successor inside the same
//! `&mut self` call, so no caller can observe zero or two open rallies.
//! Undecided rallies superseded in older data are restored as abandoned.

use std::mem;

use tracing::{debug, info, warn};

use super::inference::resolve_origin_tag;
use super::roster::resolve_side;
use super::timeline::{self, Score, TimelineEntry};
use crate::error::{CoreError, Result};
use crate::models::{Action, ActionRecord, Match, RallyLog, Roster, TeamSide};

/// Timestamps past 9999-12-31T23:59:59.999Z are rejected on restore.
pub const MAX_TIMESTAMP_MS: i64 = 253_402_300_799_999;

fn check_timestamp(what: &str, id: &str, at: i64) -> Result<()> {
    if at > MAX_TIMESTAMP_MS {
        return Err(CoreError::Validation(format!("{} {} has out-of-range timestamp {}", what, id, at)));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The actor is on neither roster of the match.
    UnknownActor,
}

/// Result of [`MatchLog::record`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded {
        rally_id: String,
        action_id: String,
        /// Set when this action decided the rally.
        outcome: Option<TeamSide>,
        /// Id of the rally opened to succeed the one just finalized.
        next_rally_id: Option<String>,
    },
    /// Nothing was appended; the log is unchanged.
    Ignored(IgnoreReason),
}

impl RecordOutcome {
    pub fn outcome(&self) -> Option<TeamSide> {
        match self {
            RecordOutcome::Recorded { outcome, .. } => *outcome,
            RecordOutcome::Ignored(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchLog {
    info: Match,
    /// Closed rallies in creation order: finalized or abandoned.
    history: Vec<RallyLog>,
    current: RallyLog,
    /// Latest timestamp handed out, for strictly increasing `at`/`created_at`.
    last_at: i64,
}

impl MatchLog {
    /// Start a match with one empty open rally.
    pub fn new(info: Match, now_ms: i64) -> Self {
        let created_at = now_ms.max(info.created_at);
        let current = RallyLog::open(info.id.clone(), created_at);
        Self { info, history: Vec::new(), current, last_at: created_at }
    }

    /// Restore a match from persisted rallies.
    ///
    /// The newest open rally becomes current. Older open rallies are dropped
    /// when empty and kept as abandoned history otherwise. A current rally
    /// older than the last closed one is re-stamped so it stays last in
    /// timeline order. If no rally is open a fresh one is created at `now_ms`.
    pub fn from_records(info: Match, mut rallies: Vec<RallyLog>, now_ms: i64) -> Result<Self> {
        if let Some(foreign) = rallies.iter().find(|r| r.match_id != info.id) {
            return Err(CoreError::Validation(format!(
                "Rally {} belongs to match {}, not {}",
                foreign.id, foreign.match_id, info.id
            )));
        }
        check_timestamp("match", &info.id, info.created_at)?;
        for rally in &rallies {
            check_timestamp("rally", &rally.id, rally.created_at)?;
            for record in rally.actions() {
                check_timestamp("action", &record.id, record.at)?;
            }
        }

        rallies.sort_by_key(|rally| rally.created_at);
        let last_at = rallies
            .iter()
            .flat_map(|r| std::iter::once(r.created_at).chain(r.actions().iter().map(|a| a.at)))
            .fold(info.created_at, i64::max);

        let newest_open = rallies.iter().rposition(RallyLog::is_open);
        let current = newest_open.map(|idx| rallies.remove(idx));

        let mut history = Vec::with_capacity(rallies.len());
        for mut rally in rallies {
            if !rally.is_open() {
                history.push(rally);
            } else if rally.actions().is_empty() {
                warn!(match_id = %info.id, rally_id = %rally.id, "dropping empty stale open rally");
            } else {
                warn!(
                    match_id = %info.id,
                    rally_id = %rally.id,
                    actions = rally.actions().len(),
                    "keeping undecided stale rally as abandoned"
                );
                rally.abandon();
                history.push(rally);
            }
        }

        let mut log = Self {
            current: RallyLog::open(info.id.clone(), 0),
            info,
            history,
            last_at,
        };
        match current {
            Some(mut open) => {
                let newest_closed = log.history.last().map(|r| r.created_at);
                if newest_closed.is_some_and(|at| open.created_at < at) {
                    warn!(
                        match_id = %log.info.id,
                        rally_id = %open.id,
                        "open rally predates the last closed rally; re-stamping it"
                    );
                    open.created_at = log.tick(now_ms);
                }
                log.current = open;
            }
            None => {
                let created_at = log.tick(now_ms);
                log.current = RallyLog::open(log.info.id.clone(), created_at);
            }
        }
        Ok(log)
    }

    pub fn info(&self) -> &Match {
        &self.info
    }

    pub fn id(&self) -> &str {
        &self.info.id
    }

    pub fn set_date(&mut self, date: impl Into<String>) {
        self.info.date = date.into();
    }

    pub fn roster(&self) -> &Roster {
        &self.info.roster
    }

    /// Put an actor on a side. Already logged actions keep their history.
    pub fn assign(&mut self, actor_id: impl Into<String>, side: TeamSide) {
        self.info.roster.assign(actor_id, side);
    }

    pub fn unassign(&mut self, actor_id: &str) -> bool {
        self.info.roster.unassign(actor_id)
    }

    pub fn current(&self) -> &RallyLog {
        &self.current
    }

    pub fn history(&self) -> &[RallyLog] {
        &self.history
    }

    /// All rallies in timeline order: finalized history, then the current rally.
    pub fn rallies(&self) -> impl Iterator<Item = &RallyLog> {
        self.history.iter().chain(std::iter::once(&self.current))
    }

    pub fn find_rally(&self, rally_id: &str) -> Option<&RallyLog> {
        self.rallies().find(|r| r.id == rally_id)
    }

    /// Append an action by `actor_id` to the current rally.
    ///
    /// Unknown actors are ignored. Attacks get their origin tag resolved from
    /// the current rally here, replacing any tag the caller supplied. When the
    /// action decides the rally, it is finalized and its successor opened.
    pub fn record(&mut self, actor_id: &str, action: Action, now_ms: i64) -> RecordOutcome {
        let Some(side) = resolve_side(&self.info, actor_id) else {
            debug!(match_id = %self.info.id, actor_id, "action ignored: actor not on roster");
            return RecordOutcome::Ignored(IgnoreReason::UnknownActor);
        };

        let mut action = action;
        if let Action::Attack { origin_tag, .. } = &mut action {
            *origin_tag = resolve_origin_tag(self.current.actions(), side, &self.info.roster);
        }

        let at = self.tick(now_ms);
        let record = ActionRecord::new(actor_id, at, action);
        let action_id = record.id.clone();
        let rally_id = self.current.id.clone();

        let outcome = self.current.append(record, side);
        let next_rally_id = outcome.map(|winner| {
            info!(match_id = %self.info.id, rally_id = %rally_id, winner = %winner, "rally decided");
            self.advance(now_ms)
        });

        RecordOutcome::Recorded { rally_id, action_id, outcome, next_rally_id }
    }

    /// Award the current rally to `side` and open its successor.
    /// Returns the id of the rally that was finalized.
    pub fn finalize_manually(&mut self, side: TeamSide, now_ms: i64) -> String {
        let rally_id = self.current.id.clone();
        self.current.finalize_manually(side);
        info!(match_id = %self.info.id, rally_id = %rally_id, winner = %side, "rally awarded manually");
        self.advance(now_ms);
        rally_id
    }

    /// Remove a rally. Removing the current rally replaces it with a new open one.
    pub fn delete_rally(&mut self, rally_id: &str, now_ms: i64) -> bool {
        if self.current.id == rally_id {
            let created_at = self.tick(now_ms);
            self.current = RallyLog::open(self.info.id.clone(), created_at);
            return true;
        }
        let before = self.history.len();
        self.history.retain(|r| r.id != rally_id);
        before != self.history.len()
    }

    pub fn timeline(&self) -> Vec<TimelineEntry<'_>> {
        timeline::build_ordered(self.rallies())
    }

    pub fn score(&self) -> Score {
        timeline::final_score(&self.timeline())
    }

    /// Split back into persisted parts, rallies in timeline order.
    pub fn into_records(self) -> (Match, Vec<RallyLog>) {
        let mut rallies = self.history;
        rallies.push(self.current);
        (self.info, rallies)
    }

    /// Finalized current rally goes to history; a fresh one takes its place.
    fn advance(&mut self, now_ms: i64) -> String {
        let created_at = self.tick(now_ms);
        let next = RallyLog::open(self.info.id.clone(), created_at);
        let next_id = next.id.clone();
        let done = mem::replace(&mut self.current, next);
        self.history.push(done);
        next_id
    }

    fn tick(&mut self, now_ms: i64) -> i64 {
        let at = now_ms.max(self.last_at.saturating_add(1));
        self.last_at = at;
        at
    }
}
