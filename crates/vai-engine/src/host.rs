//! Engine ownership across graphics context loss.
//!
//! An [`Engine`] never recovers from a lost context. [`SurfaceHost`] keeps the
//! configuration and a context factory around so that, after a loss, the next
//! frame tries to build a fresh engine on a new context.

use crate::coords::ColorRgba;
use crate::device::RenderBackend;
use crate::render::{Engine, EngineConfig, EngineError, FrameOutcome};

/// Owns one [`Engine`] and rebuilds it when its context goes away.
pub struct SurfaceHost<B, F>
where
    B: RenderBackend,
    F: FnMut() -> Option<B>,
{
    connect: F,
    config: EngineConfig,
    engine: Engine<B>,
    last_size: Option<(f64, f64)>,
    rebuilds: u64,
}

impl<B, F> SurfaceHost<B, F>
where
    B: RenderBackend,
    F: FnMut() -> Option<B>,
{
    /// Builds the first engine from whatever `connect` returns.
    pub fn new(mut connect: F, config: EngineConfig) -> Result<Self, EngineError> {
        let engine = Engine::new(connect(), config.clone())?;
        Ok(Self {
            connect,
            config,
            engine,
            last_size: None,
            rebuilds: 0,
        })
    }

    #[inline]
    pub fn engine(&self) -> &Engine<B> {
        &self.engine
    }

    /// Number of times the engine was rebuilt on a new context.
    #[inline]
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    /// Records the client size and forwards it to the engine.
    pub fn on_resize(&mut self, width: f64, height: f64) {
        self.last_size = Some((width, height));
        self.engine.resize_handler(Some(width), Some(height));
    }

    pub fn apply_resizes<I>(&mut self, sizes: I)
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        for (w, h) in sizes {
            self.on_resize(w, h);
        }
    }

    /// Changes the clear color, also for engines built later.
    pub fn set_background_color(&mut self, color: ColorRgba) {
        self.config.background_color = color;
        self.engine.set_background_color(color);
    }

    /// Renders through the current engine.
    ///
    /// A frame that finds the context lost is dropped, and a new engine is
    /// built for the next one. Errors only come from that rebuild.
    pub fn render<C: AsRef<[f32]>>(&mut self, chunks: &[C], num_instances: u32) -> Result<FrameOutcome, EngineError> {
        let outcome = self.engine.render(chunks, num_instances);
        if outcome == FrameOutcome::ContextLost {
            self.rebuild()?;
        }
        Ok(outcome)
    }

    fn rebuild(&mut self) -> Result<(), EngineError> {
        let Some(backend) = (self.connect)() else {
            log::trace!("no graphics context available yet");
            return Ok(());
        };

        let mut engine = Engine::new(Some(backend), self.config.clone())?;
        if !engine.is_usable() {
            return Ok(());
        }

        match self.last_size {
            Some((w, h)) => engine.resize_handler(Some(w), Some(h)),
            None => engine.resize_handler(None, None),
        }

        self.engine = engine;
        self.rebuilds += 1;
        log::info!("renderer rebuilt on a new graphics context (rebuild #{})", self.rebuilds);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingBackend;

    fn frame() -> Vec<f32> {
        vec![0.5; 15]
    }

    #[test]
    fn first_engine_comes_from_the_factory() {
        let (backend, _rec) = RecordingBackend::new();
        let mut pending = vec![backend];
        let mut host = SurfaceHost::new(move || pending.pop(), EngineConfig::default()).unwrap();

        assert!(host.engine().is_usable());
        assert_eq!(host.render(&[frame()], 1).unwrap(), FrameOutcome::Drawn { instances: 1 });
        assert_eq!(host.rebuilds(), 0);
    }

    #[test]
    fn lost_context_is_replaced_on_the_next_frame() {
        let (first, first_rec) = RecordingBackend::new();
        let (second, second_rec) = RecordingBackend::new();
        let mut pending = vec![second, first];
        let mut host = SurfaceHost::new(move || pending.pop(), EngineConfig::default()).unwrap();

        host.on_resize(400.0, 200.0);
        first_rec.set_lost(true);

        assert_eq!(host.render(&[frame()], 1).unwrap(), FrameOutcome::ContextLost);
        assert_eq!(host.rebuilds(), 1);
        assert_eq!(second_rec.resizes(), vec![(400, 200)]);

        second_rec.clear();
        assert_eq!(host.render(&[frame()], 1).unwrap(), FrameOutcome::Drawn { instances: 1 });
        assert_eq!(second_rec.draws().len(), 1);
    }

    #[test]
    fn keeps_trying_while_no_context_is_available() {
        let (late, late_rec) = RecordingBackend::new();
        let mut attempts = 0;
        let mut late = Some(late);
        let connect = move || {
            attempts += 1;
            if attempts < 3 { None } else { late.take() }
        };
        let mut host = SurfaceHost::new(connect, EngineConfig::default()).unwrap();
        assert!(!host.engine().is_usable());

        assert_eq!(host.render(&[frame()], 1).unwrap(), FrameOutcome::ContextLost);
        assert!(!host.engine().is_usable());
        assert_eq!(host.render(&[frame()], 1).unwrap(), FrameOutcome::ContextLost);
        assert!(host.engine().is_usable());

        late_rec.clear();
        assert_eq!(host.render(&[frame()], 1).unwrap(), FrameOutcome::Drawn { instances: 1 });
    }

    #[test]
    fn background_color_survives_rebuild() {
        let (first, first_rec) = RecordingBackend::new();
        let (second, _second_rec) = RecordingBackend::new();
        let mut pending = vec![second, first];
        let mut host = SurfaceHost::new(move || pending.pop(), EngineConfig::default()).unwrap();

        let black = ColorRgba::new(0.0, 0.0, 0.0, 1.0);
        host.set_background_color(black);
        first_rec.set_lost(true);
        host.render(&[frame()], 1).unwrap();

        assert_eq!(host.engine().config().background_color, black);
    }
}
