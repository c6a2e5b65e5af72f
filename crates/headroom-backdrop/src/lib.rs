//! Headroom Backdrop - Full-frame procedural background
//!
//! A throttled software rasterizer that composites seven layers per drawn
//! frame onto a private RGB surface:
//!
//! 1. Base gradient (replace)
//! 2. Radial bloom (additive)
//! 3. Rotated, scrolling light slats from a cached tile (additive)
//! 4. Rolling highlight band (additive)
//! 5. Scanlines (replace)
//! 6. Grain speckles (additive)
//! 7. Vignette (replace)
//!
//! Every layer's energy tracks the smoothed glitch intensity.

pub mod color;
pub mod frame_loop;
pub mod renderer;
pub mod surface;
pub mod tile;

pub use color::*;
pub use frame_loop::*;
pub use renderer::*;
pub use surface::*;
pub use tile::*;
