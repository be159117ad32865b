use crate::coords::ColorRgba;
use crate::shader::ShaderProgram;

/// What the engine needs from a graphics context.
///
/// Every GPU object the engine creates goes through this trait, so the engine
/// owns the returned handles exclusively. [`WgpuBackend`](super::WgpuBackend)
/// is the real implementation.
///
/// Implementations are driven from a single owning thread; the engine never
/// calls into a backend concurrently.
pub trait RenderBackend {
    /// Handle to a GPU vertex buffer.
    type Buffer;

    /// `true` once the underlying context can no longer be used.
    fn is_lost(&self) -> bool;

    /// Physical pixels per logical pixel of the target surface.
    fn pixel_ratio(&self) -> f64;

    /// Current client (logical) size of the target surface.
    fn client_size(&self) -> (f64, f64);

    /// Current backing-store size of the target surface, in physical pixels.
    fn surface_size(&self) -> (u32, u32);

    /// Largest buffer, in bytes, the context can allocate.
    fn max_buffer_size(&self) -> u64;

    /// Reallocates the backing store.
    fn resize_surface(&mut self, width: u32, height: u32);

    /// Builds the render pipeline for a linked program and its vertex layout.
    fn prepare_pipeline(&mut self, desc: &PipelineDesc<'_>) -> anyhow::Result<()>;

    /// Creates a vertex buffer initialized with `contents`, never written again.
    fn create_static_buffer(&mut self, label: &str, contents: &[u8]) -> Self::Buffer;

    /// Creates an uninitialized vertex buffer of `size` bytes that is rewritten every frame.
    fn create_instance_buffer(&mut self, label: &str, size: u64) -> Self::Buffer;

    /// Uploads `data` at offset 0 of `buffer`.
    fn write_buffer(&mut self, buffer: &Self::Buffer, data: &[u8]);

    /// Clears the surface and issues one instanced draw.
    fn draw_instanced(&mut self, frame: &DrawFrame<'_, Self::Buffer>) -> DrawStatus;
}

/// Inputs for building the render pipeline.
pub struct PipelineDesc<'a> {
    pub program: &'a ShaderProgram,
    /// Slot 0 is the static primitive, then one slot per instance attribute.
    pub vertex_buffers: &'a [wgpu::VertexBufferLayout<'a>],
}

/// One frame's draw submission.
pub struct DrawFrame<'a, T> {
    /// Backing-store size the viewport covers.
    pub viewport: (u32, u32),
    pub clear_color: ColorRgba,
    pub primitive: &'a T,
    /// Buffers in slot order, starting at slot 1.
    pub instance_buffers: &'a [T],
    pub vertex_count: u32,
    pub instance_count: u32,
}

/// Result of a draw submission.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DrawStatus {
    /// The frame was submitted and presented.
    Presented,
    /// The surface was temporarily unavailable; nothing was drawn.
    Skipped,
    /// The context is gone; no further draw can succeed.
    Lost,
}
