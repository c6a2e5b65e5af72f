//! Headroom Runtime - Avatar engine composition and hosting
//!
//! `AvatarEngine` wires the smoother, mouth, glitch perturber and backdrop
//! over one scene and runs them in a fixed per-frame order. The voice layer
//! reaches it through `VoiceSink`. Hosts either call `frame` from their own
//! display callback or hand a `SharedEngine` to the tokio `driver`.

pub mod driver;
pub mod engine;
pub mod output;
pub mod telemetry;
pub mod voice;

pub use driver::*;
pub use engine::*;
pub use output::*;
pub use telemetry::{init_tracing, LogFormat, LOG_ENV};
pub use voice::*;
