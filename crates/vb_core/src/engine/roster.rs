//! Actor → side resolution against a match roster.

use std::collections::HashMap;

use crate::models::{Match, Roster, TeamSide};

/// Resolve which side an actor plays for in `m`. `None` if unassigned.
pub fn resolve_side(m: &Match, actor_id: &str) -> Option<TeamSide> {
    resolve_in_roster(&m.roster, actor_id)
}

pub fn resolve_in_roster(roster: &Roster, actor_id: &str) -> Option<TeamSide> {
    TeamSide::BOTH
        .into_iter()
        .find(|side| roster.side_list(*side).iter().any(|id| id == actor_id))
}

/// Anything that can answer "which side is this actor on".
pub trait SideLookup {
    fn side_of(&self, actor_id: &str) -> Option<TeamSide>;
}

impl SideLookup for Roster {
    fn side_of(&self, actor_id: &str) -> Option<TeamSide> {
        resolve_in_roster(self, actor_id)
    }
}

/// Precomputed lookup for scans that resolve many actors against one roster.
#[derive(Debug, Clone, Default)]
pub struct SideMap {
    sides: HashMap<String, TeamSide>,
}

impl SideMap {
    pub fn from_roster(roster: &Roster) -> Self {
        let mut sides = HashMap::new();
        for side in TeamSide::BOTH {
            for id in roster.side_list(side) {
                sides.insert(id.clone(), side);
            }
        }
        Self { sides }
    }
}

impl SideLookup for SideMap {
    fn side_of(&self, actor_id: &str) -> Option<TeamSide> {
        self.sides.get(actor_id).copied()
    }
}
