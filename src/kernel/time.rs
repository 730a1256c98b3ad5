use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// A reading of a monotonic clock, expressed as the time elapsed since the
/// clock's origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(pub Duration);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(Duration::ZERO);

    pub fn from_millis(ms: u64) -> Self {
        Timestamp(Duration::from_millis(ms))
    }

    /// Time between `earlier` and `self`. Saturates to zero if the readings
    /// are out of order.
    pub fn since(&self, earlier: Timestamp) -> Duration {
        self.0.saturating_sub(earlier.0)
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0.as_secs_f64()
    }
}

/// Source of monotonic time for the telemetry layer.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall clock backed by `Instant`, anchored at construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.origin.elapsed())
    }
}

/// Deterministic clock that only moves when told to. Also counts how many
/// times it was read.
#[derive(Debug, Default)]
pub struct ManualClock {
    nanos: AtomicU64,
    reads: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(start: Duration) -> Self {
        let clock = Self::default();
        clock.nanos.store(saturating_nanos(start), Ordering::SeqCst);
        clock
    }

    pub fn advance(&self, by: Duration) {
        let step = saturating_nanos(by);
        // The closure always returns Some, so this cannot fail.
        let _ = self
            .nanos
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| Some(n.saturating_add(step)));
    }

    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    /// Current reading, without counting it as a read.
    pub fn peek(&self) -> Timestamp {
        Timestamp(Duration::from_nanos(self.nanos.load(Ordering::SeqCst)))
    }
}

/// Readings past ~584 years pin at `u64::MAX` nanoseconds.
fn saturating_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.peek()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_counts_reads_but_not_peeks() {
        let clock = ManualClock::starting_at(Duration::from_millis(5));
        clock.advance(Duration::from_millis(10));

        assert_eq!(clock.peek(), Timestamp::from_millis(15));
        assert_eq!(clock.reads(), 0);
        assert_eq!(clock.now(), Timestamp::from_millis(15));
        assert_eq!(clock.reads(), 1);
    }

    #[test]
    fn manual_clock_saturates_instead_of_wrapping() {
        let clock = ManualClock::starting_at(Duration::MAX);
        assert_eq!(clock.peek(), Timestamp(Duration::from_nanos(u64::MAX)));

        let clock = ManualClock::starting_at(Duration::from_nanos(u64::MAX - 5));
        clock.advance(Duration::from_nanos(10));
        assert_eq!(clock.peek(), Timestamp(Duration::from_nanos(u64::MAX)));

        // A step wider than u64 nanoseconds must not wrap to a small value
        let clock = ManualClock::new();
        clock.advance(Duration::MAX);
        assert_eq!(clock.peek(), Timestamp(Duration::from_nanos(u64::MAX)));
    }

    #[test]
    fn since_saturates() {
        let early = Timestamp::from_millis(10);
        let late = Timestamp::from_millis(4);
        assert_eq!(late.since(early), Duration::ZERO);
        assert_eq!(early.since(late), Duration::from_millis(6));
    }
}
