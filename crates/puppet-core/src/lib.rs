//! PUPPET Core - Fundamental types and primitives
//!
//! This crate defines the core types used throughout the avatar director:
//! - Identifiers (ClientId)
//! - Time primitives (EngineTime)
//! - Execution generations (TokenSource, Generation)
//! - Profiles, scenes, commands and the library that holds them
//! - The target parameter set and shared execution state
//! - The renderer seam

pub mod command;
pub mod error;
pub mod id;
pub mod library;
pub mod params;
pub mod profile;
pub mod render;
pub mod scene;
pub mod state;
pub mod time;
pub mod token;

pub use command::*;
pub use error::*;
pub use id::*;
pub use library::*;
pub use params::*;
pub use profile::*;
pub use render::*;
pub use scene::*;
pub use state::*;
pub use time::*;
pub use token::*;

/// Profile applied when nothing else is active, and the baseline for every merge
pub const DEFAULT_PROFILE: &str = "default";

/// Profile preferred by the idle fallback
pub const IDLE_PROFILE: &str = "idle";
