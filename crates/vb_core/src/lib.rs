//! # vb_core - Volleyball Rally Log and Point-Inference Engine
//!
//! Turns an action-by-action volleyball log into rally outcomes, a running
//! score and analysis context.
//!
//! ## Features
//! - Closed action model where result-gated fields cannot be misused
//! - Automatic point inference with atomic finalize-and-open of rallies
//! - Set-call attribution for attacks, pass quality lookup for sets
//! - Score timeline with lead state and match phase per rally
//! - Lossless JSON snapshot import/export

pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod snapshot;

pub use config::SnapshotConfig;
pub use engine::{
    classify_outcome, lead_state, match_phase, performance_score, resolve_origin_tag,
    resolve_receive_quality_before_set, resolve_side, Clock, IgnoreReason, LeadState, ManualClock,
    MatchLog, MatchPhase, RecordOutcome, Score, Scorebook, SystemClock, TimelineEntry,
};
pub use error::{CoreError, Result};
pub use models::{
    Action, ActionKind, ActionRecord, AttackResult, BlockResult, Match, Player, Quality, RallyLog,
    RallyState, Roster, ServeResult, SetCallType, SetResult, TeamSide, TouchResult,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
