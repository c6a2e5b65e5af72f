//! Headroom Core - Fundamental types for the audio-reactive avatar engine
//!
//! This crate defines the types shared by every Headroom component:
//! - Frame time and the session clock (FrameTime, SessionClock)
//! - Normalized control signals (Intensity)
//! - Avatar profiles: every tunable constant as a data record
//! - The error taxonomy for configuration and lifecycle boundaries
//!
//! Nothing in here draws or animates. Components in `headroom-motion` and
//! `headroom-backdrop` consume these types once per frame.

pub mod clock;
pub mod error;
pub mod profile;
pub mod signal;
pub mod time;

pub use clock::*;
pub use error::*;
pub use profile::*;
pub use signal::*;
pub use time::*;
