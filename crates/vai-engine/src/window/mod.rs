//! Single-window runtime loop.
//!
//! Owns the `winit` event loop and window, and wires them to a
//! [`SurfaceHost`](crate::host::SurfaceHost) over the wgpu backend.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, WgpuHost};
