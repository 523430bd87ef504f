//! PUPPET State - Stage state and the per-tick state machinery
//!
//! This crate provides:
//! - `Stage`: the one struct holding all shared engine state
//! - `ProfileResolver`: baseline + overlay profile application
//! - `ParameterAnimator`: per-frame smoothing and lip-sync injection
//! - `IdleMonitor`: inactivity fallback

pub mod animator;
pub mod idle;
pub mod resolver;
pub mod stage;

#[cfg(test)]
mod testing;

pub use animator::*;
pub use idle::*;
pub use resolver::*;
pub use stage::*;
