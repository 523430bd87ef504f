//! Time primitives
//!
//! Engine time is a monotonic millisecond counter measured from engine start.
//! All scheduling decisions (step deadlines, idle timeout) are made against it,
//! so a manual clock can drive the whole engine deterministically.

use std::ops::{Add, Sub};
use std::time::Duration;

/// Engine time - milliseconds since engine start
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EngineTime(pub u64);

impl EngineTime {
    pub const ZERO: EngineTime = EngineTime(0);

    #[inline]
    pub fn from_millis(millis: u64) -> Self {
        EngineTime(millis)
    }

    #[inline]
    pub fn as_millis(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn saturating_add(self, duration: Duration) -> Self {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        EngineTime(self.0.saturating_add(millis))
    }

    /// Time elapsed since `earlier`, zero if `earlier` is in the future
    #[inline]
    pub fn since(self, earlier: EngineTime) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Duration> for EngineTime {
    type Output = EngineTime;

    #[inline]
    fn add(self, rhs: Duration) -> Self::Output {
        self.saturating_add(rhs)
    }
}

impl Sub<EngineTime> for EngineTime {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: EngineTime) -> Self::Output {
        self.since(rhs)
    }
}

impl std::fmt::Debug for EngineTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t({}ms)", self.0)
    }
}
