//! GPU device, surface and the backend seam the engine draws through.
//!
//! This module is responsible for:
//! - the [`RenderBackend`] trait every engine GPU call goes through
//! - creating the wgpu Instance/Adapter/Device/Queue for a window
//! - configuring the surface and presenting frames
//! - turning device loss and fatal surface errors into a lost flag

mod backend;
mod gpu;
mod init;
mod surface;

pub use backend::{DrawFrame, DrawStatus, PipelineDesc, RenderBackend};
pub use gpu::WgpuBackend;
pub use init::GpuInit;
