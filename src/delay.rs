//! Busy-wait delays against the global time source.

use crate::error::BringupError;
use crate::hal::TimeSource;

/// Ticks needed to cover `tenths` tenths of a second.
///
/// Fails on a zero tick rate instead of waiting forever.
pub fn required_ticks(counts_per_second: u64, tenths: u32) -> Result<u64, BringupError> {
    if counts_per_second == 0 {
        return Err(BringupError::ZeroTickRate);
    }
    let ticks = counts_per_second as u128 * tenths as u128 / 10;
    Ok(u64::try_from(ticks).unwrap_or(u64::MAX))
}

/// Spin until at least `tenths` tenths of a second have elapsed.
///
/// Returns the number of ticks that actually elapsed.
pub fn busy_wait<C: TimeSource + ?Sized>(clock: &C, tenths: u32) -> Result<u64, BringupError> {
    let required = required_ticks(clock.counts_per_second(), tenths)?;
    let start = clock.now();
    loop {
        let elapsed = clock.now().wrapping_sub(start);
        if elapsed >= required {
            return Ok(elapsed);
        }
        core::hint::spin_loop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    struct SteppingClock {
        now: Cell<u64>,
        step: u64,
        cps: u64,
    }

    impl TimeSource for SteppingClock {
        fn now(&self) -> u64 {
            let t = self.now.get();
            self.now.set(t.wrapping_add(self.step));
            t
        }

        fn counts_per_second(&self) -> u64 {
            self.cps
        }
    }

    #[test]
    fn test_zero_tick_rate_is_fatal() {
        let clock = SteppingClock {
            now: Cell::new(0),
            step: 1,
            cps: 0,
        };
        assert_eq!(busy_wait(&clock, 20), Err(BringupError::ZeroTickRate));
    }

    #[test]
    fn test_wait_covers_threshold() {
        let clock = SteppingClock {
            now: Cell::new(0),
            step: 3,
            cps: 1000,
        };
        let elapsed = busy_wait(&clock, 20).unwrap();
        assert!(elapsed >= 2000);
        assert!(elapsed < 2000 + 3);
    }

    #[test]
    fn test_slow_tick_rate_still_terminates() {
        // Fewer than ten ticks per second
        let clock = SteppingClock {
            now: Cell::new(0),
            step: 1,
            cps: 4,
        };
        assert_eq!(required_ticks(4, 20), Ok(8));
        assert!(busy_wait(&clock, 20).unwrap() >= 8);
    }

    #[test]
    fn test_counter_wraparound() {
        let clock = SteppingClock {
            now: Cell::new(u64::MAX - 5),
            step: 2,
            cps: 10,
        };
        assert!(busy_wait(&clock, 10).unwrap() >= 10);
    }
}
