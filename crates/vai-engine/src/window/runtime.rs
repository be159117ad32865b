use std::sync::Arc;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, FrameCtx};
use crate::device::{GpuInit, WgpuBackend};
use crate::host::SurfaceHost;
use crate::render::EngineConfig;
use crate::time::FrameClock;

/// Context factory used by the runtime's host.
pub type WgpuConnect = Box<dyn FnMut() -> Option<WgpuBackend>>;

/// Host over the wgpu backend.
pub type WgpuHost = SurfaceHost<WgpuBackend, WgpuConnect>;

/// Window and renderer configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub gpu: GpuInit,
    pub engine: EngineConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "vai".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            gpu: GpuInit::default(),
            engine: EngineConfig::default(),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    pub fn run<A>(config: RuntimeConfig, app: A) -> Result<()>
    where
        A: App + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let mut state = AppState {
            config,
            app,
            entry: None,
            exit_requested: false,
        };

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        Ok(())
    }
}

struct WindowEntry {
    window: Arc<Window>,
    host: WgpuHost,
    clock: FrameClock,
}

impl WindowEntry {
    fn sync_size(&mut self) {
        let logical = self.window.inner_size().to_logical::<f64>(self.window.scale_factor());
        self.host.on_resize(logical.width, logical.height);
    }
}

struct AppState<A: App> {
    config: RuntimeConfig,
    app: A,
    entry: Option<WindowEntry>,
    exit_requested: bool,
}

/// Each call asks wgpu for a fresh adapter, device and surface on `window`.
fn connect(window: Arc<Window>, init: GpuInit) -> WgpuConnect {
    Box::new(move || match pollster::block_on(WgpuBackend::new(Arc::clone(&window), init.clone())) {
        Ok(backend) => Some(backend),
        Err(e) => {
            log::error!("graphics context unavailable: {e:#}");
            None
        }
    })
}

impl<A: App> AppState<A> {
    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = Arc::new(event_loop.create_window(attrs).context("failed to create window")?);

        let host = SurfaceHost::new(
            connect(Arc::clone(&window), self.config.gpu.clone()),
            self.config.engine.clone(),
        )
        .context("failed to initialize renderer")?;

        let mut entry = WindowEntry {
            window,
            host,
            clock: FrameClock::new(),
        };
        entry.sync_size();
        entry.window.request_redraw();

        self.entry = Some(entry);
        Ok(())
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        self.entry = None;
        event_loop.exit();
    }
}

impl<A: App> ApplicationHandler for AppState<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }

        if let Err(e) = self.create_window_entry(event_loop) {
            log::error!("{e:#}");
            self.request_exit(event_loop);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        // Continuous redraw.
        if let Some(entry) = &self.entry {
            entry.window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(entry) = self.entry.as_mut().filter(|e| e.window.id() == window_id) else {
            return;
        };

        if self.app.on_window_event(&event) == AppControl::Exit {
            self.request_exit(event_loop);
            return;
        }

        match event {
            WindowEvent::CloseRequested => self.request_exit(event_loop),

            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                entry.sync_size();
                entry.window.request_redraw();
            }

            WindowEvent::RedrawRequested => {
                let mut ctx = FrameCtx {
                    window: &entry.window,
                    host: &mut entry.host,
                    time: entry.clock.tick(),
                };

                if self.app.on_frame(&mut ctx) == AppControl::Exit {
                    self.request_exit(event_loop);
                }
            }

            _ => {}
        }
    }
}
