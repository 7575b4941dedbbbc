use serde::{Deserialize, Serialize};
use tracing::debug;

use super::action::ActionRecord;
use super::side::TeamSide;
use crate::engine::inference::classify_outcome;

/// Lifecycle of a rally: `Open` until a point is awarded, then `Finalized`.
///
/// `Abandoned` marks an undecided rally that was superseded by a newer open
/// rally without ever being finalized. It keeps its actions, awards nothing
/// and accepts no further changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RallyState {
    Open,
    Finalized(TeamSide),
    Abandoned,
}

/// One rally's ordered action sequence and its outcome.
///
/// Once the outcome is set (or the rally is abandoned) the log is frozen:
/// further appends and manual finalization are no-ops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RallyLog {
    pub id: String,
    pub match_id: String,
    /// Unix milliseconds.
    pub created_at: i64,
    #[serde(default, alias = "point")]
    outcome: Option<TeamSide>,
    #[serde(default, alias = "events")]
    actions: Vec<ActionRecord>,
    /// Persisted as an ordinary undecided rally; re-derived on restore.
    #[serde(skip)]
    abandoned: bool,
}

impl RallyLog {
    /// Create an empty open rally.
    pub fn open(match_id: impl Into<String>, created_at: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            match_id: match_id.into(),
            created_at,
            outcome: None,
            actions: Vec::new(),
            abandoned: false,
        }
    }

    pub fn state(&self) -> RallyState {
        match self.outcome {
            Some(side) => RallyState::Finalized(side),
            None if self.abandoned => RallyState::Abandoned,
            None => RallyState::Open,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state() == RallyState::Open
    }

    pub fn outcome(&self) -> Option<TeamSide> {
        self.outcome
    }

    pub fn actions(&self) -> &[ActionRecord] {
        &self.actions
    }

    /// Append an action whose actor has already been resolved to `actor_side`.
    ///
    /// Returns the side awarded the point when this action decides the rally.
    /// On a finalized rally nothing changes and `None` is returned.
    pub fn append(&mut self, record: ActionRecord, actor_side: TeamSide) -> Option<TeamSide> {
        match self.state() {
            RallyState::Open => {}
            RallyState::Finalized(side) => {
                debug!(rally_id = %self.id, outcome = %side, "append ignored: rally already finalized");
                return None;
            }
            RallyState::Abandoned => {
                debug!(rally_id = %self.id, "append ignored: rally abandoned");
                return None;
            }
        }

        let decided = classify_outcome(&record.action, actor_side);
        self.actions.push(record);
        if decided.is_some() {
            self.outcome = decided;
        }
        decided
    }

    /// Force the outcome. Returns `false` (and changes nothing) unless the
    /// rally is open.
    pub fn finalize_manually(&mut self, side: TeamSide) -> bool {
        if !self.is_open() {
            return false;
        }
        self.outcome = Some(side);
        true
    }

    /// Freeze an open rally without awarding it. Returns `false` unless the
    /// rally was open.
    pub fn abandon(&mut self) -> bool {
        if !self.is_open() {
            return false;
        }
        self.abandoned = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::action::{Action, AttackResult, ServeResult};

    #[test]
    fn test_decisive_action_finalizes() {
        let mut rally = RallyLog::open("m1", 0);
        let decided = rally.append(ActionRecord::new("x", 1, Action::Serve(ServeResult::Error)), TeamSide::Away);
        assert_eq!(decided, Some(TeamSide::Home));
        assert_eq!(rally.state(), RallyState::Finalized(TeamSide::Home));
        assert_eq!(rally.actions().len(), 1);
    }

    #[test]
    fn test_append_after_finalize_is_noop() {
        let mut rally = RallyLog::open("m1", 0);
        rally.append(ActionRecord::new("b", 1, Action::attack(AttackResult::Kill)), TeamSide::Home);
        let frozen = rally.clone();

        let decided = rally.append(ActionRecord::new("c", 2, Action::attack(AttackResult::Kill)), TeamSide::Away);
        assert_eq!(decided, None);
        assert!(!rally.finalize_manually(TeamSide::Away));
        assert_eq!(rally, frozen);
    }

    #[test]
    fn test_manual_finalize_without_actions() {
        let mut rally = RallyLog::open("m1", 0);
        assert!(rally.finalize_manually(TeamSide::Away));
        assert_eq!(rally.outcome(), Some(TeamSide::Away));
        assert!(rally.actions().is_empty());
    }

    #[test]
    fn test_abandoned_rally_is_frozen_and_undecided() {
        let mut rally = RallyLog::open("m1", 0);
        rally.append(ActionRecord::new("s", 1, Action::Serve(ServeResult::In)), TeamSide::Home);
        assert!(rally.abandon());
        assert_eq!(rally.state(), RallyState::Abandoned);
        assert!(!rally.is_open());
        let frozen = rally.clone();

        let decided = rally.append(ActionRecord::new("s", 2, Action::Serve(ServeResult::Ace)), TeamSide::Home);
        assert_eq!(decided, None);
        assert!(!rally.finalize_manually(TeamSide::Home));
        assert!(!rally.abandon());
        assert_eq!(rally, frozen);

        let text = serde_json::to_value(&rally).unwrap();
        assert!(text["outcome"].is_null());
        assert!(text.get("abandoned").is_none());
    }

    #[test]
    fn test_legacy_rally_fields() {
        let rally: RallyLog = serde_json::from_value(serde_json::json!({
            "id": "r1", "matchId": "m1", "createdAt": 10, "point": "our",
            "events": [{ "id": "e1", "actorId": "p1", "at": 11, "kind": "serve", "result": "ace" }]
        }))
        .unwrap();
        assert_eq!(rally.outcome(), Some(TeamSide::Home));
        assert_eq!(rally.actions().len(), 1);

        let text = serde_json::to_value(&rally).unwrap();
        assert_eq!(text["outcome"], "home");
        assert!(text.get("point").is_none());
    }
}
