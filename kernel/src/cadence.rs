// Fixed-period cadences on top of the base timer tick.
//
// The firmware wakes every BASE_TICK_MS; each subsystem has its own
// period and decides from the timestamp whether it is due.

pub const BASE_TICK_MS: u32 = 5;

#[derive(Debug, Clone, Copy)]
pub struct Interval {
    period_ms: u64,
    next_at: u64,
}

impl Interval {
    pub const fn new(period_ms: u32, now: u64) -> Self {
        Self {
            period_ms: period_ms as u64,
            next_at: now,
        }
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    /// True at most once per period. A late call fires once and
    /// re-anchors on `now`; missed periods are not replayed.
    pub fn due(&mut self, now: u64) -> bool {
        if now < self.next_at {
            return false;
        }
        self.next_at = now + self.period_ms;
        true
    }
}
