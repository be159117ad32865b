use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::surface;
use super::{DrawFrame, DrawStatus, GpuInit, PipelineDesc, RenderBackend};

/// [`RenderBackend`] drawing into a winit window through wgpu.
///
/// Owns the surface, device and queue for one window, plus the single
/// render pipeline the engine prepares at construction.
pub struct WgpuBackend {
    window: Arc<Window>,

    /// Surface bound to the window; the `Arc` keeps the window alive for it.
    surface: wgpu::Surface<'static>,

    device: wgpu::Device,
    queue: wgpu::Queue,

    /// Active surface configuration.
    config: wgpu::SurfaceConfiguration,

    /// Current backing-store size in physical pixels. May be zero while the
    /// configuration still holds the last drawable size.
    size: PhysicalSize<u32>,

    pipeline: Option<wgpu::RenderPipeline>,

    /// Set by the device-lost callback or a fatal surface error.
    lost: Arc<AtomicBool>,
}

impl WgpuBackend {
    /// Acquires a device for `window` and configures its surface.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu; hosts block on
    /// it with `pollster`.
    pub async fn new(window: Arc<Window>, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(Arc::clone(&window))
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("vai device"),
                required_features: init.required_features,
                required_limits: init.required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let lost = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&lost);
        device.set_device_lost_callback(move |reason, message| {
            log::error!("wgpu device lost ({reason:?}): {message}");
            flag.store(true, Ordering::Release);
        });

        let caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&caps, init.prefer_srgb)
            .context("no supported surface formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: init.present_mode,
            alpha_mode: surface::choose_alpha_mode(&caps, init.alpha_mode),
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };

        surface.configure(&device, &config);

        log::info!(
            "wgpu backend ready: {:?} ({:?}), surface {:?} {}x{}",
            adapter.get_info().name,
            adapter.get_info().backend,
            format,
            config.width,
            config.height
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            size,
            pipeline: None,
            lost,
        })
    }

    /// Returns the active surface format.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn window(&self) -> &Window {
        &self.window
    }
}

impl RenderBackend for WgpuBackend {
    type Buffer = wgpu::Buffer;

    fn is_lost(&self) -> bool {
        self.lost.load(Ordering::Acquire)
    }

    fn pixel_ratio(&self) -> f64 {
        self.window.scale_factor()
    }

    fn client_size(&self) -> (f64, f64) {
        let logical = self.window.inner_size().to_logical::<f64>(self.window.scale_factor());
        (logical.width, logical.height)
    }

    fn surface_size(&self) -> (u32, u32) {
        (self.size.width, self.size.height)
    }

    fn max_buffer_size(&self) -> u64 {
        self.device.limits().max_buffer_size
    }

    fn resize_surface(&mut self, width: u32, height: u32) {
        surface::apply_resize(
            &self.surface,
            &self.device,
            &mut self.config,
            &mut self.size,
            PhysicalSize::new(width, height),
        );
    }

    fn prepare_pipeline(&mut self, desc: &PipelineDesc<'_>) -> Result<()> {
        let limits = self.device.limits();
        anyhow::ensure!(
            desc.vertex_buffers.len() <= limits.max_vertex_buffers as usize,
            "{} vertex buffers requested, device allows {}",
            desc.vertex_buffers.len(),
            limits.max_vertex_buffers
        );
        for layout in desc.vertex_buffers {
            anyhow::ensure!(
                layout.array_stride <= u64::from(limits.max_vertex_buffer_array_stride),
                "vertex stride {} exceeds the device limit {}",
                layout.array_stride,
                limits.max_vertex_buffer_array_stride
            );
        }

        let vertex = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("vai vertex stage"),
            source: wgpu::ShaderSource::Wgsl(desc.program.vertex_source().into()),
        });
        let fragment = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("vai fragment stage"),
            source: wgpu::ShaderSource::Wgsl(desc.program.fragment_source().into()),
        });

        let pipeline_layout = self.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("vai pipeline layout"),
            bind_group_layouts: &[],
            immediate_size: 0,
        });

        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("vai instanced pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex,
                entry_point: Some(desc.program.vertex_entry()),
                compilation_options: Default::default(),
                buffers: desc.vertex_buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment,
                entry_point: Some(desc.program.fragment_entry()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.config.format,
                    blend: Some(straight_alpha_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        self.pipeline = Some(pipeline);
        Ok(())
    }

    fn create_static_buffer(&mut self, label: &str, contents: &[u8]) -> wgpu::Buffer {
        self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage: wgpu::BufferUsages::VERTEX,
        })
    }

    fn create_instance_buffer(&mut self, label: &str, size: u64) -> wgpu::Buffer {
        self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn write_buffer(&mut self, buffer: &wgpu::Buffer, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        self.queue.write_buffer(buffer, 0, data);
    }

    fn draw_instanced(&mut self, frame: &DrawFrame<'_, wgpu::Buffer>) -> DrawStatus {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(err) => {
                let status =
                    surface::map_surface_error(&self.surface, &self.device, &self.config, self.size, err);
                if status == DrawStatus::Lost {
                    self.lost.store(true, Ordering::Release);
                }
                return status;
            }
        };

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("vai frame encoder"),
        });

        // The viewport may not exceed the configured surface.
        let width = frame.viewport.0.min(self.config.width);
        let height = frame.viewport.1.min(self.config.height);

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("vai instanced pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(frame.clear_color.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let Some(pipeline) = self.pipeline.as_ref()
                && frame.instance_count > 0
                && width > 0
                && height > 0
            {
                rpass.set_viewport(0.0, 0.0, width as f32, height as f32, 0.0, 1.0);
                rpass.set_pipeline(pipeline);
                rpass.set_vertex_buffer(0, frame.primitive.slice(..));
                for (slot, buffer) in frame.instance_buffers.iter().enumerate() {
                    rpass.set_vertex_buffer(slot as u32 + 1, buffer.slice(..));
                }
                rpass.draw(0..frame.vertex_count, 0..frame.instance_count);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        self.window.pre_present_notify();
        surface_texture.present();

        if self.is_lost() { DrawStatus::Lost } else { DrawStatus::Presented }
    }
}

fn straight_alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }
}
