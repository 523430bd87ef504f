//! PUPPET Test Harness - Deterministic director simulation
//!
//! This crate provides:
//! - Recording renderer and scripted audio backend
//! - A manual-clock simulator around the real director
//! - End-to-end behavior scenarios

pub mod recorder;
pub mod scenarios;
pub mod simulator;

pub use recorder::*;
pub use scenarios::*;
pub use simulator::*;
