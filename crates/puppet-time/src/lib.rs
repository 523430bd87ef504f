//! PUPPET Time - Engine clocks and frame pacing
//!
//! This crate provides:
//! - The `Clock` seam with a wall clock and a manual clock
//! - Frame pacing: converting tick-to-tick wall time into the animator's delta

pub mod clock;
pub mod frame;

pub use clock::*;
pub use frame::*;
