//! Millisecond clocks for driving the game loop
//!
//! Game code never reads time on its own; the driver samples a [`Clock`]
//! once per frame and passes `now` down. Tests and the scripted demo use
//! [`ManualClock`] to make every frame boundary exact.

use std::cell::Cell;
use std::time::Instant;

use crate::Millis;

/// Source of monotonic milliseconds
pub trait Clock {
    fn now_ms(&self) -> Millis;
}

/// Wall clock, measured from construction
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> Millis {
        self.origin.elapsed().as_millis() as Millis
    }
}

/// Hand-cranked clock; only moves when told to
pub struct ManualClock {
    now: Cell<Millis>,
}

impl ManualClock {
    pub fn new(start: Millis) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn advance(&self, delta: Millis) {
        self.now.set(self.now.get() + delta);
    }

    pub fn set(&self, now: Millis) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Millis {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_starts_where_told() {
        let clock = ManualClock::new(500);
        assert_eq!(clock.now_ms(), 500);
    }

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::new(0);
        clock.advance(16);
        clock.advance(16);
        assert_eq!(clock.now_ms(), 32);

        clock.set(1000);
        assert_eq!(clock.now_ms(), 1000);
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }
}
