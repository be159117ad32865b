//! Vai engine crate.
//!
//! Instanced renderer for shadowed rounded rectangles: one static quad, one
//! interleaved record per rectangle, one draw call per frame. The window
//! runtime and the reconnecting [`host::SurfaceHost`] sit on top of the
//! backend-agnostic [`render::Engine`].

pub mod coords;
pub mod device;
pub mod frame;
pub mod layout;
pub mod render;
pub mod shader;

pub mod host;
pub mod logging;
pub mod time;

pub mod core;
pub mod window;

#[cfg(test)]
mod testing;

pub use coords::{ColorRgba, CornerRadii, Rect, ViewportState};
pub use frame::{FrameDataPacker, FrameOverflow, RectInstance};
pub use host::SurfaceHost;
pub use render::{Engine, EngineConfig, EngineError, FrameOutcome};
