use bytemuck::{Pod, Zeroable};

use crate::coords::{ColorRgba, CornerRadii, Rect};

/// One interleaved instance record for the built-in shader (60 bytes):
///
///  offset  0  bounds  [f32; 4]  v_box     (min x, min y, max x, max y)
///  offset 16  color   [f32; 4]  v_color   (straight alpha)
///  offset 32  corner  [f32; 4]  v_corner
///  offset 48  window  [f32; 2]  v_window  (surface size the bounds are in)
///  offset 56  sigma   f32       v_sigma   (shadow blur)
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct RectInstance {
    pub bounds: [f32; 4],
    pub color: [f32; 4],
    pub corner: [f32; 4],
    pub window: [f32; 2],
    pub sigma: f32,
}

impl RectInstance {
    /// Floats per record; matches the default attribute layout.
    pub const FLOATS: usize = 15;

    pub fn new(rect: Rect, color: ColorRgba, radii: CornerRadii, window: [f32; 2], sigma: f32) -> Self {
        Self {
            bounds: rect.edges(),
            color: color.to_array(),
            corner: radii.to_array(),
            window,
            sigma,
        }
    }

    /// Views a layer of records as the flat float chunk `Engine::render` takes.
    #[inline]
    pub fn as_floats(instances: &[RectInstance]) -> &[f32] {
        bytemuck::cast_slice(instances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_is_fifteen_floats() {
        assert_eq!(std::mem::size_of::<RectInstance>(), RectInstance::FLOATS * 4);
    }

    #[test]
    fn floats_follow_attribute_order() {
        let inst = RectInstance::new(
            Rect::new(0.0, 0.0, 100.0, 100.0),
            ColorRgba::new(0.867, 0.867, 0.867, 1.0),
            CornerRadii::all(1.0),
            [1000.0, 1000.0],
            4.0,
        );
        let floats = RectInstance::as_floats(std::slice::from_ref(&inst));
        assert_eq!(
            floats,
            &[0.0, 0.0, 100.0, 100.0, 0.867, 0.867, 0.867, 1.0, 1.0, 1.0, 1.0, 1.0, 1000.0, 1000.0, 4.0]
        );
    }
}
