use crate::coords::{ColorRgba, ViewportState};
use crate::device::{DrawFrame, DrawStatus, PipelineDesc, RenderBackend};
use crate::frame::{check_capacity, FrameDataPacker, FrameOverflow};
use crate::layout::{self, InstancedBinding, InstancedLayout, PrimitiveBinding, QUAD_VERTICES};
use crate::shader::{self, ShaderProgram};

use super::{EngineConfig, EngineError};

/// What happened to one [`Engine::render`] call.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The frame was uploaded, drawn and presented.
    Drawn { instances: u32 },
    /// The chunks did not fit. Nothing was uploaded or drawn, and the bound
    /// instance count is unchanged.
    Overflowed(FrameOverflow),
    /// Buffers for this many instances would exceed the context's buffer
    /// size limit. Nothing was uploaded or drawn, and the bound instance
    /// count is unchanged.
    BufferTooLarge { instances: u32, bytes: u64, limit: u64 },
    /// The surface had no texture to draw into (minimized, outdated, timed
    /// out). The engine stays usable.
    SurfaceUnavailable,
    /// No graphics context. Nothing touched the GPU.
    ContextLost,
}

/// GPU objects that only exist while the context is alive.
struct Bound<B: RenderBackend> {
    backend: B,
    program: ShaderProgram,
    primitive: PrimitiveBinding<B::Buffer>,
    instanced: InstancedBinding<B::Buffer>,
    packer: FrameDataPacker,
}

enum EngineState<B: RenderBackend> {
    Ready(Box<Bound<B>>),
    ContextLost,
}

/// Instanced renderer for one drawing surface.
///
/// Owns the backend, the compiled program, the static quad, the instance
/// buffers and the CPU frame buffer. All of it is mutated through `&mut self`,
/// so frames cannot be rendered concurrently.
///
/// Once the context is lost the engine stays disabled: every later frame is a
/// no-op returning [`FrameOutcome::ContextLost`]. Recovery means constructing
/// a new engine on a new context.
pub struct Engine<B: RenderBackend> {
    config: EngineConfig,
    viewport: ViewportState,
    state: EngineState<B>,
}

impl<B: RenderBackend> Engine<B> {
    /// Builds the engine on `backend`.
    ///
    /// A missing or already lost backend is not an error: the engine comes up
    /// disabled and logs a warning. Compile, link, layout and pipeline
    /// failures are errors.
    pub fn new(backend: Option<B>, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;

        let Some(mut backend) = backend.filter(|b| !b.is_lost()) else {
            log::warn!("no usable graphics context; renderer disabled");
            return Ok(Self {
                config,
                viewport: ViewportState::new(0, 0),
                state: EngineState::ContextLost,
            });
        };

        let program = shader::compile(&config.vertex_source, &config.fragment_source)?;
        log::debug!("shader program linked with {} vertex inputs", program.inputs().len());

        let primitive =
            layout::bind_primitive(&mut backend, &program, &config.vertex_attribute, &QUAD_VERTICES)?;

        let instance_layout = InstancedLayout::new(&config.instance_attributes);
        let instanced = layout::bind_instanced(&mut backend, &program, &instance_layout, 0)?;

        layout::check_coverage(&program, std::iter::once(&primitive.attribute).chain(&instanced.attributes))?;

        {
            let vertex_buffers = layout::vertex_buffer_layouts(&primitive, &instanced);
            backend
                .prepare_pipeline(&PipelineDesc { program: &program, vertex_buffers: &vertex_buffers })
                .map_err(|e| EngineError::Pipeline(format!("{e:#}")))?;
        }

        let (width, height) = backend.surface_size();
        log::info!(
            "renderer ready: {} instance attributes, {} floats per instance, surface {width}x{height}",
            instance_layout.specs().len(),
            instance_layout.attribute_float_count(),
        );

        Ok(Self {
            config,
            viewport: ViewportState::new(width, height),
            state: EngineState::Ready(Box::new(Bound {
                backend,
                program,
                primitive,
                instanced,
                packer: FrameDataPacker::new(0),
            })),
        })
    }

    /// `false` once the context is gone; the engine never comes back.
    pub fn is_usable(&self) -> bool {
        match &self.state {
            EngineState::Ready(bound) => !bound.backend.is_lost(),
            EngineState::ContextLost => false,
        }
    }

    /// Instance count the buffers are currently sized for.
    pub fn bound_instances(&self) -> Option<usize> {
        self.bound().map(|b| b.instanced.num_instances())
    }

    /// Per-instance layout, while the context is alive.
    pub fn instance_layout(&self) -> Option<&InstancedLayout> {
        self.bound().map(|b| b.instanced.layout())
    }

    pub fn program(&self) -> Option<&ShaderProgram> {
        self.bound().map(|b| &b.program)
    }

    #[inline]
    pub fn viewport(&self) -> ViewportState {
        self.viewport
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Clear color for subsequent frames.
    pub fn set_background_color(&mut self, color: ColorRgba) {
        self.config.background_color = color;
    }

    /// Resizes the backing store to `floor(pixel_ratio × client size)`.
    ///
    /// An explicit width or height replaces the surface's client dimension
    /// when it is finite and positive. The surface is only reallocated when
    /// the computed size differs from the current one.
    pub fn resize_handler(&mut self, width: Option<f64>, height: Option<f64>) {
        let Self { viewport, state, .. } = self;
        let EngineState::Ready(bound) = state else {
            return;
        };

        let ratio = bound.backend.pixel_ratio();
        let (client_w, client_h) = bound.backend.client_size();
        let usable = |v: Option<f64>| v.filter(|v| v.is_finite() && *v > 0.0);
        let w = usable(width).unwrap_or(client_w);
        let h = usable(height).unwrap_or(client_h);

        if let Some((w, h)) = viewport.apply(ratio, w, h) {
            log::debug!("surface resized to {w}x{h} (pixel ratio {ratio})");
            bound.backend.resize_surface(w, h);
        }
    }

    /// Applies a stream of `(width, height)` client sizes in order.
    pub fn apply_resizes<I>(&mut self, sizes: I)
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        for (w, h) in sizes {
            self.resize_handler(Some(w), Some(h));
        }
    }

    /// Draws one frame of `num_instances` instances.
    ///
    /// `chunks` are concatenated in order into the frame buffer; each must be
    /// a whole number of instance records. Buffers are rebound only when
    /// `num_instances` differs from the bound count, and only after the
    /// chunks are known to fit.
    pub fn render<C: AsRef<[f32]>>(&mut self, chunks: &[C], num_instances: u32) -> FrameOutcome {
        let outcome = match &mut self.state {
            EngineState::ContextLost => {
                log::trace!("frame skipped: no graphics context");
                return FrameOutcome::ContextLost;
            }
            EngineState::Ready(bound) if bound.backend.is_lost() => FrameOutcome::ContextLost,
            EngineState::Ready(bound) => {
                bound.frame(chunks, num_instances, self.viewport, self.config.background_color)
            }
        };

        if outcome == FrameOutcome::ContextLost {
            self.enter_context_lost();
        }
        outcome
    }

    fn bound(&self) -> Option<&Bound<B>> {
        match &self.state {
            EngineState::Ready(bound) => Some(bound),
            EngineState::ContextLost => None,
        }
    }

    fn enter_context_lost(&mut self) {
        if let EngineState::Ready(_) = self.state {
            log::warn!("graphics context lost; renderer disabled");
            self.state = EngineState::ContextLost;
        }
    }
}

impl<B: RenderBackend> Bound<B> {
    fn frame<C: AsRef<[f32]>>(
        &mut self,
        chunks: &[C],
        num_instances: u32,
        viewport: ViewportState,
        clear_color: ColorRgba,
    ) -> FrameOutcome {
        let count = num_instances as usize;
        let capacity = count.saturating_mul(self.instanced.attribute_float_count());

        if let Err(overflow) = check_capacity(chunks, capacity) {
            log::warn!("{overflow}; frame skipped");
            return FrameOutcome::Overflowed(overflow);
        }

        if count != self.instanced.num_instances() {
            let bytes = self.instanced.layout().buffer_size(count);
            let limit = self.backend.max_buffer_size();
            if bytes > limit {
                log::warn!("{num_instances} instances need {bytes}-byte buffers, limit is {limit}; frame skipped");
                return FrameOutcome::BufferTooLarge { instances: num_instances, bytes, limit };
            }

            log::debug!(
                "rebinding instance buffers: {} -> {count} instances",
                self.instanced.num_instances()
            );
            self.instanced.rebind(&mut self.backend, count);
            self.packer.resize(capacity);
        }

        if let Err(overflow) = self.packer.pack(chunks) {
            return FrameOutcome::Overflowed(overflow);
        }

        // Each attribute reads its own buffer, so every one gets the whole frame.
        let bytes = self.packer.as_bytes();
        for buffer in &self.instanced.buffers {
            self.backend.write_buffer(buffer, bytes);
        }

        let status = self.backend.draw_instanced(&DrawFrame {
            viewport: (viewport.width, viewport.height),
            clear_color,
            primitive: &self.primitive.buffer,
            instance_buffers: &self.instanced.buffers,
            vertex_count: self.primitive.vertex_count,
            instance_count: num_instances,
        });

        match status {
            DrawStatus::Presented => FrameOutcome::Drawn { instances: num_instances },
            DrawStatus::Skipped => FrameOutcome::SurfaceUnavailable,
            DrawStatus::Lost => FrameOutcome::ContextLost,
        }
    }
}
