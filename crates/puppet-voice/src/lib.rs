//! PUPPET Voice - Speech audio and lip sync
//!
//! The avatar speaks by playing a clip through an external backend. This
//! crate tracks whether it is talking, reports when a clip ends, and turns
//! the live spectrum into a mouth-open level.

pub mod backend;
pub mod controller;
pub mod loudness;

pub use backend::*;
pub use controller::*;
pub use loudness::*;
