//! PUPPET Transport - HTTP glue to the control backend
//!
//! Consumes the backend's data shapes only:
//! - `GET /api/queue` for commands
//! - `POST /api/report` for status
//! - `GET /api/profiles`, `GET /api/scenes` for the library
//! - `GET /api/status` for mute/sync toggles

pub mod client;
pub mod poller;
pub mod reporter;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use client::*;
pub use poller::*;
pub use reporter::*;
