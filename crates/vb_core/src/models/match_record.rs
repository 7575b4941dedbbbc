use serde::{Deserialize, Serialize};

use super::side::TeamSide;
use crate::error::CoreError;

/// A registered participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub name: String,
    pub created_at: i64,
}

impl Player {
    pub fn new(name: impl Into<String>, created_at: i64) -> Self {
        Self { id: uuid::Uuid::new_v4().to_string(), name: name.into(), created_at }
    }
}

/// Home and away actor lists of one match. The two lists never share an id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RosterWire")]
pub struct Roster {
    home: Vec<String>,
    away: Vec<String>,
}

#[derive(Deserialize)]
struct RosterWire {
    #[serde(default, alias = "our")]
    home: Vec<String>,
    #[serde(default, alias = "opp")]
    away: Vec<String>,
}

impl TryFrom<RosterWire> for Roster {
    type Error = CoreError;

    fn try_from(wire: RosterWire) -> Result<Self, Self::Error> {
        Roster::new(wire.home, wire.away)
    }
}

impl Roster {
    /// Build a roster, rejecting an actor listed on both sides.
    pub fn new(home: Vec<String>, away: Vec<String>) -> Result<Self, CoreError> {
        if let Some(dup) = home.iter().find(|id| away.contains(id)) {
            return Err(CoreError::Validation(format!(
                "Actor {} is listed on both home and away rosters",
                dup
            )));
        }
        let mut roster = Roster::default();
        for id in home {
            roster.assign(id, TeamSide::Home);
        }
        for id in away {
            roster.assign(id, TeamSide::Away);
        }
        Ok(roster)
    }

    pub fn side_list(&self, side: TeamSide) -> &[String] {
        match side {
            TeamSide::Home => &self.home,
            TeamSide::Away => &self.away,
        }
    }

    pub fn contains(&self, actor_id: &str) -> bool {
        self.home.iter().chain(self.away.iter()).any(|id| id == actor_id)
    }

    /// Put an actor on `side`, moving them off the other side if needed.
    pub fn assign(&mut self, actor_id: impl Into<String>, side: TeamSide) {
        let actor_id = actor_id.into();
        self.unassign(&actor_id);
        match side {
            TeamSide::Home => self.home.push(actor_id),
            TeamSide::Away => self.away.push(actor_id),
        }
    }

    /// Remove an actor from both sides. Returns whether they were present.
    pub fn unassign(&mut self, actor_id: &str) -> bool {
        let before = self.home.len() + self.away.len();
        self.home.retain(|id| id != actor_id);
        self.away.retain(|id| id != actor_id);
        before != self.home.len() + self.away.len()
    }

    pub fn is_empty(&self) -> bool {
        self.home.is_empty() && self.away.is_empty()
    }
}

/// Match metadata and roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    /// Calendar date, `yyyy-mm-dd`.
    pub date: String,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub roster: Roster,
}

impl Match {
    pub fn new(date: impl Into<String>, created_at: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            date: date.into(),
            created_at,
            roster: Roster::default(),
        }
    }
}
