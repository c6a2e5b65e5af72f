//! Headroom Motion - Procedural avatar motion from two scalar signals
//!
//! The voice layer only provides loudness-like scalars, never phonemes.
//! This crate turns them into stable, self-recovering motion:
//!
//! - `IntensitySmoother`: step input → continuous ramp
//! - `MouthArticulator`: speech intensity → jaw open/close cycle
//! - `GlitchPerturber`: smoothed glitch intensity → timed rotation/scale jumps
//!   that always return to rest
//!
//! Components never look up scene nodes themselves beyond the `SceneGraph`
//! trait. A missing node silently skips the update that needs it.

pub mod glitch;
pub mod mouth;
pub mod scene;
pub mod smoother;
pub mod timer;
pub mod tongue;

pub use glitch::*;
pub use mouth::*;
pub use scene::*;
pub use smoother::*;
pub use timer::*;
pub use tongue::*;
