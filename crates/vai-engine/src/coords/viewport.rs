/// Backing-store bookkeeping for the drawing surface.
///
/// `width`/`height` are the backing-store size in physical pixels, as last
/// applied to the surface. `pixel_ratio` is the ratio read on the last resize.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewportState {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f64,
}

impl ViewportState {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height, pixel_ratio: 1.0 }
    }

    /// Computes the backing-store size for a client size and pixel ratio.
    ///
    /// Returns `Some` only when the size differs from the current one, in which
    /// case the state is updated and the caller must resize the surface.
    pub fn apply(&mut self, pixel_ratio: f64, client_width: f64, client_height: f64) -> Option<(u32, u32)> {
        let ratio = if pixel_ratio.is_finite() { pixel_ratio.max(0.0) } else { 1.0 };
        self.pixel_ratio = ratio;

        let width = backing_dimension(ratio, client_width);
        let height = backing_dimension(ratio, client_height);
        if width == self.width && height == self.height {
            return None;
        }

        self.width = width;
        self.height = height;
        Some((width, height))
    }

    #[inline]
    pub fn is_drawable(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Products this close to a whole pixel count are treated as that count.
const PIXEL_SNAP: f64 = 1e-6;

/// `floor(ratio * client)`, saturating to zero for negative or NaN input.
///
/// A client size derived as `physical / ratio` does not always multiply back
/// to exactly `physical`; such products are snapped to the nearest whole
/// pixel so the backing store keeps the window's physical size.
#[inline]
pub fn backing_dimension(ratio: f64, client: f64) -> u32 {
    let scaled = ratio.max(0.0) * client;
    let nearest = scaled.round();
    if (scaled - nearest).abs() <= PIXEL_SNAP {
        nearest as u32
    } else {
        scaled.floor() as u32
    }
}
