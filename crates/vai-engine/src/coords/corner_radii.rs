/// Per-corner radii for a rounded rectangle, in pixels.
///
/// Names follow the on-screen position in the shader's y-up pixel space, so
/// `top_*` corners sit on the rectangle's max-y edge.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct CornerRadii {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_right: f32,
    pub bottom_left: f32,
}

impl CornerRadii {
    #[inline]
    pub const fn new(top_left: f32, top_right: f32, bottom_right: f32, bottom_left: f32) -> Self {
        Self { top_left, top_right, bottom_right, bottom_left }
    }

    /// Uniform radius on all four corners.
    #[inline]
    pub const fn all(r: f32) -> Self {
        Self::new(r, r, r, r)
    }

    /// Packs the radii in the order the fragment stage selects them:
    /// `(min-x, min-y)`, `(max-x, min-y)`, `(max-x, max-y)`, `(min-x, max-y)`.
    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.bottom_left, self.bottom_right, self.top_right, self.top_left]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_in_quadrant_order() {
        let r = CornerRadii::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(r.to_array(), [4.0, 3.0, 2.0, 1.0]);
    }
}
