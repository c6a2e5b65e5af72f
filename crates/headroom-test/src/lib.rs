//! Headroom Test Harness - Simulation and scenario testing
//!
//! This crate provides:
//! - A fixed-rate (optionally jittered) host driving an engine
//! - Scripted voice-layer signals
//! - Synthetic speech amplitude
//! - Rolling-window draw counting for throttle checks
//! - End-to-end scenario tests

pub mod rig;
pub mod scenarios;
pub mod script;
pub mod simulator;
pub mod throttle;

pub use rig::*;
pub use script::*;
pub use simulator::*;
pub use throttle::*;
