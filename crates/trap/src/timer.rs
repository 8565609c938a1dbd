use crate::TrapStats;

/// A free-running tick counter with one compare register that raises the
/// timer interrupt once the counter reaches it.
pub trait Timer {
    const TICKS_PER_SECOND: u64;

    fn now(&self) -> u64;

    /// Program the next deadline. Writing it also acknowledges a pending
    /// timer interrupt.
    fn set_compare(&self, deadline: u64);
}

pub const fn seconds_to_ticks<T: Timer>(seconds: u64) -> u64 {
    seconds.saturating_mul(T::TICKS_PER_SECOND)
}

/// Periodic timer interrupt body: push the deadline `interval` ticks past the
/// current time and publish that time. Returns the time read.
pub fn rearm<T: Timer>(timer: &T, stats: &TrapStats, interval: u64) -> u64 {
    let now = timer.now();
    timer.set_compare(now.wrapping_add(interval));
    stats.record_timestamp(now);
    now
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTimer;

    #[test]
    fn test_seconds_to_ticks() {
        assert_eq!(seconds_to_ticks::<MockTimer>(0), 0);
        assert_eq!(seconds_to_ticks::<MockTimer>(1), 32_768);
        assert_eq!(seconds_to_ticks::<MockTimer>(3), 3 * 32_768);
        assert_eq!(seconds_to_ticks::<MockTimer>(u64::MAX), u64::MAX);
    }

    #[test]
    fn test_rearm_one_second_ahead() {
        let timer = MockTimer::at(1_000_000);
        let stats = TrapStats::new();

        let now = rearm(&timer, &stats, seconds_to_ticks::<MockTimer>(1));

        assert_eq!(now, 1_000_000);
        assert_eq!(timer.compare.get(), Some(1_000_000 + 32_768));
        assert_eq!(stats.timestamp(), 1_000_000);
    }

    #[test]
    fn test_rearm_follows_the_clock() {
        let timer = MockTimer::at(0);
        let stats = TrapStats::new();
        let interval = seconds_to_ticks::<MockTimer>(1);

        for tick in [0, 32_770, 65_600, 98_400] {
            timer.now.set(tick);
            rearm(&timer, &stats, interval);

            assert_eq!(timer.compare.get(), Some(tick + interval));
            assert_eq!(stats.timestamp(), tick);
        }
    }

    #[test]
    fn test_rearm_wraps_deadline() {
        let timer = MockTimer::at(u64::MAX - 10);
        let stats = TrapStats::new();

        rearm(&timer, &stats, 20);

        assert_eq!(timer.compare.get(), Some(9));
        assert_eq!(stats.timestamp(), u64::MAX - 10);
    }
}
