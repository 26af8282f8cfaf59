//! Uniform, aspect-preserving fit of widget content into its box.
//!
//! Widget content is always drawn at its type's native size and then scaled
//! by `min(W / Nw, H / Nh)`, centered inside the `(W, H)` box. Resize handles
//! are free-form; this transform is what keeps ring thickness, text-to-icon
//! ratios, and so on from distorting.

use crate::model::{Bounds, Size};

/// Smallest widget size on each axis, as a fraction of native size.
pub const MIN_SIZE_RATIO: f32 = 0.10;

/// Placement of native-size content inside a widget box.
///
/// Content point `(cx, cy)` lands at `(offset_x + cx * scale, offset_y + cy * scale)`
/// in the box's local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentTransform {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl ContentTransform {
    pub const IDENTITY: ContentTransform = ContentTransform {
        scale: 1.0,
        offset_x: 0.0,
        offset_y: 0.0,
    };

    /// Map a point from native content space into the box's local frame.
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (self.offset_x + x * self.scale, self.offset_y + y * self.scale)
    }

    /// Where the scaled content sits inside the box (box-local coordinates).
    pub fn content_bounds(&self, native: Size) -> Bounds {
        Bounds::new(
            self.offset_x,
            self.offset_y,
            native.width * self.scale,
            native.height * self.scale,
        )
    }
}

/// Fit `native`-size content into a `box_size` box.
///
/// Degenerate native sizes fall back to an unscaled, top-left placement.
pub fn fit_content(box_size: Size, native: Size) -> ContentTransform {
    if native.width <= 0.0 || native.height <= 0.0 {
        return ContentTransform::IDENTITY;
    }
    let w = box_size.width.max(0.0);
    let h = box_size.height.max(0.0);
    let scale = (w / native.width).min(h / native.height);
    ContentTransform {
        scale,
        offset_x: (w - native.width * scale) / 2.0,
        offset_y: (h - native.height * scale) / 2.0,
    }
}

/// Minimum box for a widget of the given native size.
pub fn min_size(native: Size) -> Size {
    native.scaled(MIN_SIZE_RATIO)
}

/// Raise `size` to the per-type floor on each axis independently.
pub fn enforce_min_size(size: Size, native: Size) -> Size {
    let floor = min_size(native);
    Size::new(size.width.max(floor.width), size.height.max(floor.height))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn wide_box_scales_by_height_and_centers_horizontally() {
        let t = fit_content(Size::new(300.0, 150.0), Size::new(280.0, 280.0));
        assert!(approx(t.scale, 150.0 / 280.0));
        assert!(approx(t.offset_y, 0.0));
        assert!(approx(t.offset_x, (300.0 - 150.0) / 2.0));
    }

    #[test]
    fn tall_box_scales_by_width_and_centers_vertically() {
        let t = fit_content(Size::new(120.0, 400.0), Size::new(240.0, 200.0));
        assert!(approx(t.scale, 0.5));
        assert!(approx(t.offset_x, 0.0));
        assert!(approx(t.offset_y, (400.0 - 100.0) / 2.0));
        let content = t.content_bounds(Size::new(240.0, 200.0));
        assert!(approx(content.center().y, 200.0));
    }

    #[test]
    fn native_aspect_box_fills_exactly() {
        let t = fit_content(Size::new(140.0, 140.0), Size::new(280.0, 280.0));
        assert!(approx(t.scale, 0.5));
        assert_eq!(t.apply(280.0, 280.0), (140.0, 140.0));
    }

    #[test]
    fn degenerate_native_size_is_identity() {
        assert_eq!(
            fit_content(Size::new(10.0, 10.0), Size::new(0.0, 5.0)),
            ContentTransform::IDENTITY
        );
    }

    #[test]
    fn min_size_floor_is_per_axis() {
        let native = Size::new(280.0, 280.0);
        let s = enforce_min_size(Size::new(300.0, 4.0), native);
        assert_eq!(s.width, 300.0);
        assert!(approx(s.height, 28.0));
    }
}
