//! Point inference and backward context lookups over a rally's actions.
//!
//! All functions here are total: "no answer" is `None`, never an error.

use super::roster::SideLookup;
use crate::models::{
    Action, ActionRecord, AttackResult, BlockResult, Quality, ServeResult, SetCallType, SetResult,
    TeamSide, TouchResult,
};

/// Decide whether `action`, performed by a player of `actor_side`, ends the
/// rally, and if so which side wins the point.
pub fn classify_outcome(action: &Action, actor_side: TeamSide) -> Option<TeamSide> {
    let opposite = actor_side.opponent();
    match action {
        Action::Attack { result, .. } => match result {
            AttackResult::Kill => Some(actor_side),
            AttackResult::Error => Some(opposite),
            AttackResult::Effective | AttackResult::Continue => None,
        },
        Action::Serve(result) => match result {
            ServeResult::Ace => Some(actor_side),
            ServeResult::Error => Some(opposite),
            ServeResult::Effective | ServeResult::In => None,
        },
        Action::Block(result) => match result {
            BlockResult::Point => Some(actor_side),
            BlockResult::Error => Some(opposite),
            BlockResult::Effective | BlockResult::Touch => None,
        },
        Action::Receive(touch) | Action::Dig(touch) => match touch {
            TouchResult::Error => Some(opposite),
            TouchResult::Ok { .. } => None,
        },
        Action::Set(set) => match set {
            SetResult::Error => Some(opposite),
            SetResult::Ok { .. } => None,
        },
    }
}

/// Set call that fed an attack by `attacker_side`.
///
/// Walks the rally backwards and stops at the first set made by the
/// attacker's side: its call is returned when it was a good, tagged set;
/// anything else ends the search with `None`.
pub fn resolve_origin_tag(
    actions: &[ActionRecord],
    attacker_side: TeamSide,
    sides: &impl SideLookup,
) -> Option<SetCallType> {
    let nearest_set = actions.iter().rev().find(|record| {
        matches!(record.action, Action::Set(_))
            && sides.side_of(&record.actor_id) == Some(attacker_side)
    })?;

    match nearest_set.action {
        Action::Set(SetResult::Ok { call }) => call,
        _ => None,
    }
}

/// Quality of the receive or dig that preceded the set at `set_index`.
///
/// Looks at actions strictly before `set_index`, nearest first, considering
/// only receives and digs by `setter_side`. An errored touch ends the search
/// with `None`; a good touch yields its (possibly unrecorded) quality.
pub fn resolve_receive_quality_before_set(
    actions: &[ActionRecord],
    set_index: usize,
    setter_side: TeamSide,
    sides: &impl SideLookup,
) -> Option<Quality> {
    let end = set_index.min(actions.len());
    let touch = actions[..end].iter().rev().find_map(|record| match record.action {
        Action::Receive(touch) | Action::Dig(touch)
            if sides.side_of(&record.actor_id) == Some(setter_side) =>
        {
            Some(touch)
        }
        _ => None,
    })?;

    match touch {
        TouchResult::Ok { quality } => quality,
        TouchResult::Error => None,
    }
}
