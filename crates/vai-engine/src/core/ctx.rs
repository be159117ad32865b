use winit::window::Window;

use crate::coords::ColorRgba;
use crate::render::FrameOutcome;
use crate::time::FrameTime;
use crate::window::WgpuHost;

use super::app::AppControl;

/// Per-frame context passed to [`App::on_frame`](super::App::on_frame).
pub struct FrameCtx<'a> {
    pub window: &'a Window,
    pub host: &'a mut WgpuHost,
    pub time: FrameTime,
}

impl FrameCtx<'_> {
    /// Logical window size, the coordinate space instance records are written in.
    pub fn logical_size(&self) -> (f32, f32) {
        let logical = self.window.inner_size().to_logical::<f64>(self.window.scale_factor());
        (logical.width as f32, logical.height as f32)
    }

    pub fn set_background_color(&mut self, color: ColorRgba) {
        self.host.set_background_color(color);
    }

    /// Draws `chunks` as one frame of `num_instances` instances.
    ///
    /// Skipped frames are not fatal. Only a failed engine rebuild asks the
    /// runtime to exit.
    pub fn render<C: AsRef<[f32]>>(&mut self, chunks: &[C], num_instances: u32) -> AppControl {
        match self.host.render(chunks, num_instances) {
            Ok(FrameOutcome::Drawn { .. }) => AppControl::Continue,
            Ok(outcome) => {
                log::trace!("frame {} not drawn: {outcome:?}", self.time.frame_index);
                AppControl::Continue
            }
            Err(e) => {
                log::error!("renderer rebuild failed: {e}");
                AppControl::Exit
            }
        }
    }
}
