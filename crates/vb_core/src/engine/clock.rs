use std::cell::Cell;

/// Millisecond time source for rally and action timestamps.
pub trait Clock {
    fn now_ms(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Hand-driven clock for replays and tests. Every read advances it by `step`.
#[derive(Debug, Clone)]
pub struct ManualClock {
    next: Cell<i64>,
    step: i64,
}

impl ManualClock {
    pub fn new(start: i64, step: i64) -> Self {
        Self { next: Cell::new(start), step }
    }

    /// A clock that never moves.
    pub fn frozen(at: i64) -> Self {
        Self::new(at, 0)
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        let now = self.next.get();
        self.next.set(now + self.step);
        now
    }
}
