//! Coordinate and geometry types shared by the engine and its hosts.
//!
//! Pixel space used by the built-in shader:
//! - origin at the bottom-left of the surface
//! - +X right, +Y up
//!
//! Each instance carries the surface size it was laid out against, so the
//! vertex stage can convert pixels to clip space without a uniform.

mod color;
mod corner_radii;
mod rect;
mod viewport;

pub use color::ColorRgba;
pub use corner_radii::CornerRadii;
pub use rect::Rect;
pub use viewport::{backing_dimension, ViewportState};
