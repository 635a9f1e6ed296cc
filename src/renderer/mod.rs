//! CPU map rendering
//!
//! Layers are planned as a display list in pixel space, then rasterized
//! with an antialiased scanline fill onto an RGBA canvas.

pub mod clip;
pub mod color;
pub mod compose;
pub mod layers;
pub mod path;
pub mod raster;
pub mod shapes;

pub use color::Rgba;
pub use compose::{MapAssets, MatchRenderer};
pub use layers::{DisplayList, DrawCommand, MarkerKind, PathKind};
pub use raster::{Canvas, Image};
