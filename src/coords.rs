// Maps pointer offsets in display space to image pixel space and back.
// The window may show the image scaled; x and y scale independently.

use crate::types::CanvasSize;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordinateMapper {
    /// Size the surface is shown at (display pixels).
    pub displayed: (f32, f32),
    /// Size of the underlying image (image pixels).
    pub natural: CanvasSize,
}

impl CoordinateMapper {
    pub fn new(displayed: (f32, f32), natural: CanvasSize) -> Self {
        Self { displayed, natural }
    }

    /// A mapper where display and image pixels coincide.
    pub fn identity(natural: CanvasSize) -> Self {
        Self::new((natural.width as f32, natural.height as f32), natural)
    }

    fn scale(&self) -> Option<(f32, f32)> {
        let (dw, dh) = self.displayed;
        if !(dw.is_finite() && dh.is_finite()) || dw <= 0.0 || dh <= 0.0 {
            return None;
        }
        Some((self.natural.width as f32 / dw, self.natural.height as f32 / dh))
    }

    /// Display offset -> image pixel. `None` when the displayed size is degenerate.
    pub fn map(&self, x_offset: f32, y_offset: f32) -> Option<(f32, f32)> {
        let (sx, sy) = self.scale()?;
        Some((x_offset * sx, y_offset * sy))
    }

    /// Image pixel -> display offset.
    pub fn unmap(&self, x_image: f32, y_image: f32) -> Option<(f32, f32)> {
        let (sx, sy) = self.scale()?;
        Some((x_image / sx, y_image / sy))
    }
}

/// Largest size with the image's aspect ratio that fits inside `bounds`.
/// Never upscales.
pub fn fit_within(image: CanvasSize, bounds: CanvasSize) -> CanvasSize {
    let s = (bounds.width as f32 / image.width as f32)
        .min(bounds.height as f32 / image.height as f32)
        .min(1.0);
    CanvasSize {
        width: ((image.width as f32 * s).round() as u32).max(1),
        height: ((image.height as f32 * s).round() as u32).max(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(w: u32, h: u32) -> CanvasSize {
        CanvasSize::new(w, h).unwrap()
    }

    #[test]
    fn test_center_maps_to_center() {
        for (dw, dh, iw, ih) in [(512.0, 512.0, 1024, 1024), (300.0, 200.0, 1536, 640), (1000.0, 10.0, 7, 3)] {
            let m = CoordinateMapper::new((dw, dh), size(iw, ih));
            let (x, y) = m.map(dw / 2.0, dh / 2.0).unwrap();
            assert!((x - iw as f32 / 2.0).abs() < 1e-3, "x={x}");
            assert!((y - ih as f32 / 2.0).abs() < 1e-3, "y={y}");
        }
    }

    #[test]
    fn test_axes_scale_independently() {
        let m = CoordinateMapper::new((100.0, 50.0), size(200, 400));
        assert_eq!(m.map(10.0, 10.0), Some((20.0, 80.0)));
        assert_eq!(m.unmap(20.0, 80.0), Some((10.0, 10.0)));
    }

    #[test]
    fn test_degenerate_display_is_noop() {
        let natural = size(64, 64);
        assert_eq!(CoordinateMapper::new((0.0, 10.0), natural).map(1.0, 1.0), None);
        assert_eq!(CoordinateMapper::new((10.0, 0.0), natural).map(1.0, 1.0), None);
        assert_eq!(CoordinateMapper::new((f32::NAN, 10.0), natural).map(1.0, 1.0), None);
        assert_eq!(CoordinateMapper::new((-5.0, 10.0), natural).unmap(1.0, 1.0), None);
    }

    #[test]
    fn test_fit_within() {
        assert_eq!(fit_within(size(2048, 1024), size(1024, 768)), size(1024, 512));
        assert_eq!(fit_within(size(600, 1200), size(1024, 768)), size(384, 768));
        assert_eq!(fit_within(size(100, 100), size(1024, 768)), size(100, 100));
    }
}
