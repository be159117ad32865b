use vai_engine::core::{App, AppControl, FrameCtx};
use vai_engine::logging::{init_logging, LoggingConfig};
use vai_engine::window::{Runtime, RuntimeConfig};
use vai_engine::{ColorRgba, CornerRadii, Rect, RectInstance};
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

const COLUMNS: usize = 4;
const ROWS: usize = 3;
const GAP: f32 = 32.0;
const FLOATERS: usize = 6;

/// Two layers per frame: a static grid of cards and a handful of floating
/// chips drifting above them. Each layer is its own chunk.
struct Studio {
    cards: Vec<RectInstance>,
    floaters: Vec<RectInstance>,
    laid_out_for: (f32, f32),
    lights_on: bool,
}

impl Studio {
    fn new() -> Self {
        Self {
            cards: Vec::with_capacity(COLUMNS * ROWS),
            floaters: Vec::with_capacity(FLOATERS),
            laid_out_for: (0.0, 0.0),
            lights_on: true,
        }
    }

    fn layout_cards(&mut self, (w, h): (f32, f32)) {
        if self.laid_out_for == (w, h) {
            return;
        }
        self.laid_out_for = (w, h);
        self.cards.clear();

        let card_w = ((w - GAP * (COLUMNS as f32 + 1.0)) / COLUMNS as f32).max(1.0);
        let card_h = ((h - GAP * (ROWS as f32 + 1.0)) / ROWS as f32).max(1.0);

        for row in 0..ROWS {
            for col in 0..COLUMNS {
                let x = GAP + col as f32 * (card_w + GAP);
                let y = GAP + row as f32 * (card_h + GAP);
                let tint = (row * COLUMNS + col) as f32 / (ROWS * COLUMNS) as f32;
                self.cards.push(RectInstance::new(
                    Rect::new(x, y, card_w, card_h),
                    ColorRgba::new(0.93 - 0.2 * tint, 0.94, 0.96, 1.0),
                    CornerRadii::new(18.0, 18.0, 6.0, 6.0),
                    [w, h],
                    6.0,
                ));
            }
        }
        log::debug!("laid out {} cards for {w}x{h}", self.cards.len());
    }

    fn animate_floaters(&mut self, (w, h): (f32, f32), t: f32) {
        self.floaters.clear();
        for i in 0..FLOATERS {
            let phase = t * 0.6 + i as f32 * std::f32::consts::TAU / FLOATERS as f32;
            let cx = w * 0.5 + phase.cos() * w * 0.3;
            let cy = h * 0.5 + (phase * 1.3).sin() * h * 0.3;
            let size = 60.0 + 20.0 * (t + i as f32).sin();
            self.floaters.push(RectInstance::new(
                Rect::new(cx - size, cy - size * 0.5, size * 2.0, size),
                ColorRgba::new(0.25, 0.45 + 0.05 * i as f32, 0.9, 0.95),
                CornerRadii::all(size * 0.5),
                [w, h],
                12.0 + 4.0 * phase.sin(),
            ));
        }
    }
}

impl App for Studio {
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let WindowEvent::KeyboardInput {
            event: KeyEvent { physical_key: PhysicalKey::Code(code), state: ElementState::Pressed, .. },
            ..
        } = event
        else {
            return AppControl::Continue;
        };

        match code {
            KeyCode::Escape => AppControl::Exit,
            KeyCode::Space => {
                self.lights_on = !self.lights_on;
                log::info!("background {}", if self.lights_on { "light" } else { "dark" });
                AppControl::Continue
            }
            _ => AppControl::Continue,
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
        let size = ctx.logical_size();
        self.layout_cards(size);
        self.animate_floaters(size, ctx.time.elapsed);

        let background = if self.lights_on {
            ColorRgba::new(0.8118, 0.7843, 0.7843, 1.0)
        } else {
            ColorRgba::new(0.08, 0.08, 0.1, 1.0)
        };
        ctx.set_background_color(background);

        let count = (self.cards.len() + self.floaters.len()) as u32;
        ctx.render(
            &[RectInstance::as_floats(&self.cards), RectInstance::as_floats(&self.floaters)],
            count,
        )
    }
}

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "Vai Studio".to_string(),
        ..RuntimeConfig::default()
    };

    Runtime::run(config, Studio::new())
}
