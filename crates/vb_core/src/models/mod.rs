pub mod action;
pub mod match_record;
pub mod rally;
pub mod side;

pub use action::{
    Action, ActionKind, ActionRecord, AttackResult, BlockResult, Quality, ServeResult, SetCallType,
    SetResult, TouchResult,
};
pub use match_record::{Match, Player, Roster};
pub use rally::{RallyLog, RallyState};
pub use side::TeamSide;
