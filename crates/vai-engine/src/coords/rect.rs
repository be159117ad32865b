/// Axis-aligned rectangle in pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Builds a rectangle from two opposite corners, in any order.
    #[inline]
    pub fn from_corners(a: [f32; 2], b: [f32; 2]) -> Self {
        Self::new(a[0], a[1], b[0] - a[0], b[1] - a[1]).normalized()
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Flips negative extents so width/height are non-negative.
    #[inline]
    pub fn normalized(self) -> Self {
        let (x, width) = if self.width < 0.0 { (self.x + self.width, -self.width) } else { (self.x, self.width) };
        let (y, height) = if self.height < 0.0 { (self.y + self.height, -self.height) } else { (self.y, self.height) };
        Self::new(x, y, width, height)
    }

    /// Returns `[min_x, min_y, max_x, max_y]`, the layout of the box attribute.
    #[inline]
    pub fn edges(self) -> [f32; 4] {
        let r = self.normalized();
        [r.x, r.y, r.x + r.width, r.y + r.height]
    }

    /// Grows the rectangle by `amount` on every side.
    #[inline]
    pub fn inflate(self, amount: f32) -> Self {
        let r = self.normalized();
        Self::new(r.x - amount, r.y - amount, r.width + 2.0 * amount, r.height + 2.0 * amount)
    }
}
