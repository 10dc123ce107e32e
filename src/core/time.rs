//! Frame timing
//!
//! Rendering runs on every redraw; logical updates are capped by a minimum
//! period between ticks. Missed periods are dropped, never caught up.

use std::time::{Duration, Instant};

/// Decides, once per displayed frame, whether a logical tick runs
#[derive(Debug, Clone)]
pub struct TickGate {
    /// Minimum wall-clock time between two accepted ticks
    min_period: Duration,
    /// When the last tick was accepted
    last_tick: Option<Instant>,
}

impl TickGate {
    /// Create a gate with the given minimum period.
    ///
    /// The first query always ticks.
    pub fn new(min_period: Duration) -> Self {
        Self {
            min_period,
            last_tick: None,
        }
    }

    /// Minimum period between ticks
    pub fn min_period(&self) -> Duration {
        self.min_period
    }

    /// Return whether a tick should run at `now`.
    ///
    /// When it should, `now` becomes the new baseline.
    pub fn try_tick(&mut self, now: Instant) -> bool {
        let due = match self.last_tick {
            Some(last) => now.saturating_duration_since(last) >= self.min_period,
            None => true,
        };

        if due {
            self.last_tick = Some(now);
        }
        due
    }
}

/// Counts of displayed frames and accepted ticks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameCounters {
    /// Frames rendered
    pub frames: u64,
    /// Logical ticks run
    pub ticks: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: Duration = Duration::from_millis(16);

    #[test]
    fn test_first_query_ticks() {
        let mut gate = TickGate::new(PERIOD);
        assert!(gate.try_tick(Instant::now()));
    }

    #[test]
    fn test_ticks_only_after_min_period() {
        let start = Instant::now();
        let mut gate = TickGate::new(PERIOD);

        // Offsets in milliseconds of successive redraws.
        let frames = [0, 5, 10, 15, 16, 20, 31, 32, 100, 101, 117];
        let expected = [
            true, false, false, false, true, false, false, true, true, false, true,
        ];

        let fired: Vec<bool> = frames
            .iter()
            .map(|&ms| gate.try_tick(start + Duration::from_millis(ms)))
            .collect();
        assert_eq!(fired, expected);
    }

    #[test]
    fn test_missed_periods_are_dropped() {
        let start = Instant::now();
        let mut gate = TickGate::new(PERIOD);
        assert!(gate.try_tick(start));

        // Ten periods pass without a redraw: only one tick follows.
        let late = start + PERIOD * 10;
        assert!(gate.try_tick(late));
        assert!(!gate.try_tick(late + Duration::from_millis(1)));
        assert!(gate.try_tick(late + PERIOD));
    }

    #[test]
    fn test_zero_period_ticks_every_frame() {
        let start = Instant::now();
        let mut gate = TickGate::new(Duration::ZERO);
        assert!((0..5).all(|_| gate.try_tick(start)));
    }
}
