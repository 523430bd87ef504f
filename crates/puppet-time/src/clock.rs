//! Clock implementations for the engine
//!
//! The director never reads the OS clock itself. It is handed an `EngineTime`
//! taken from one of these clocks, so tests can substitute a manual clock and
//! drive step waits and idle timeouts without sleeping.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use puppet_core::EngineTime;

/// Source of engine time
pub trait Clock: Send + Sync {
    fn now(&self) -> EngineTime;
}

/// Wall clock - monotonic, measured from construction
/// INVARIANT: never goes backwards
#[derive(Debug, Clone)]
pub struct SystemClock {
    reference: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock {
            reference: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> EngineTime {
        EngineTime::from_millis(self.reference.elapsed().as_millis() as u64)
    }
}

/// Manually advanced clock for simulation and tests
///
/// Clones share the same underlying time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    millis: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        ManualClock::default()
    }

    pub fn starting_at(t: EngineTime) -> Self {
        let clock = ManualClock::new();
        clock.set(t);
        clock
    }

    /// Move time forward
    pub fn advance(&self, dt: Duration) -> EngineTime {
        let ms = u64::try_from(dt.as_millis()).unwrap_or(u64::MAX);
        let previous = self
            .millis
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |t| Some(t.saturating_add(ms)))
            .unwrap_or_else(|t| t);
        EngineTime(previous.saturating_add(ms))
    }

    /// Jump to an absolute time (ignored if it would go backwards)
    pub fn set(&self, t: EngineTime) {
        self.millis.fetch_max(t.as_millis(), Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> EngineTime {
        EngineTime(self.millis.load(Ordering::Acquire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_monotonic() {
        let clock = SystemClock::new();

        let t1 = clock.now();
        std::thread::sleep(Duration::from_millis(10));
        let t2 = clock.now();

        assert!(t2 > t1);
    }

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new();
        let view = clock.clone();

        clock.advance(Duration::from_millis(250));
        assert_eq!(view.now(), EngineTime::from_millis(250));
    }

    #[test]
    fn test_manual_clock_advance_saturates() {
        let clock = ManualClock::starting_at(EngineTime::from_millis(1000));
        assert_eq!(clock.advance(Duration::MAX), EngineTime(u64::MAX));
        assert_eq!(clock.advance(Duration::from_millis(5)), EngineTime(u64::MAX));
        assert_eq!(clock.now(), EngineTime(u64::MAX));
    }

    #[test]
    fn test_manual_clock_never_goes_back() {
        let clock = ManualClock::starting_at(EngineTime::from_millis(1000));
        clock.set(EngineTime::from_millis(10));
        assert_eq!(clock.now(), EngineTime::from_millis(1000));
    }
}
