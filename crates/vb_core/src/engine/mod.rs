//! Rally inference, per-match logs and score timelines.

pub mod clock;
pub mod inference;
pub mod match_log;
pub mod roster;
pub mod scorebook;
pub mod scoring;
pub mod timeline;

pub use clock::{Clock, ManualClock, SystemClock};
pub use inference::{classify_outcome, resolve_origin_tag, resolve_receive_quality_before_set};
pub use match_log::{IgnoreReason, MatchLog, RecordOutcome};
pub use roster::{resolve_side, SideLookup, SideMap};
pub use scorebook::Scorebook;
pub use scoring::performance_score;
pub use timeline::{lead_state, match_phase, LeadState, MatchPhase, Score, TimelineEntry};
