//! Execution generations
//!
//! Every execution captures the generation current at its start. Starting a
//! new authoritative execution bumps the counter; anything still holding an
//! older generation must treat itself as cancelled at its next check.

use std::sync::atomic::{AtomicU64, Ordering};

/// Generation captured by an in-flight execution
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(pub u64);

/// Monotonic generation counter
#[derive(Debug, Default)]
pub struct TokenSource {
    current: AtomicU64,
}

impl TokenSource {
    pub fn new() -> Self {
        TokenSource::default()
    }

    /// Current generation
    #[inline]
    pub fn current(&self) -> Generation {
        Generation(self.current.load(Ordering::Acquire))
    }

    /// Invalidate every outstanding generation and return the new one
    pub fn bump(&self) -> Generation {
        Generation(self.current.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Is `generation` still authoritative?
    #[inline]
    pub fn is_current(&self, generation: Generation) -> bool {
        self.current() == generation
    }
}
