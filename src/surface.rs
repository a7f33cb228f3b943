//! The paint surface: three layers, the pointer state machine and mask export.
//!
//! * background — the source image, redrawn whenever a new image is loaded.
//! * paint — what the user scribbles; the mask is derived from it on export.
//! * cursor — a translucent brush preview, redrawn on every move and cleared
//!   when the pointer leaves.
//!
//! A surface starts *unmounted*. Every operation that touches pixels is a
//! silent no-op until [`PaintSurface::mount`] has run, so callers never need
//! to order their setup around it.

use crate::codec::{self, UNPAINTED};
use crate::coords::CoordinateMapper;
use crate::error::Result;
use crate::input::PointerEvent;
use crate::types::{BrushStroke, CanvasSize, Color, MaskArtifact, PaintColor, PixelBuffer};
use image::RgbaImage;
use log::{debug, info};
use std::ops::{Deref, DerefMut};

/// Alpha of the filled brush preview (the outline is opaque).
const CURSOR_FILL_ALPHA: u8 = 0x88;

/// Background shown before any source image arrives.
const EMPTY_BACKGROUND: [u8; 4] = [0, 0, 0, 255];

/// What happens to existing strokes when a new source image is loaded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReloadPolicy {
    /// Keep strokes where they overlap the new canvas.
    #[default]
    Preserve,
    /// Start from an unpainted layer.
    Reset,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceConfig {
    /// Brush radius in image pixels.
    pub cursor_size: u32,
    /// Display tint of painted pixels and of the brush preview.
    pub mask_color: Color,
    /// How strongly the paint layer covers the background on screen, 0..1.
    pub mask_opacity: f32,
    pub reload: ReloadPolicy,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            cursor_size: 10,
            mask_color: Color::rgb(0x23, 0x27, 0x2d),
            mask_opacity: 0.85,
            reload: ReloadPolicy::Preserve,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerState {
    /// Pointer not over the surface.
    Idle,
    /// Over the surface, no button held: only the preview is drawn.
    Hovering,
    /// Over the surface with a button held: moves also paint.
    Painting,
}

struct Layers {
    background: PixelBuffer,
    paint: PixelBuffer,
    cursor: PixelBuffer,
}

impl Layers {
    fn new(size: CanvasSize) -> Self {
        Self {
            background: PixelBuffer::filled(size, EMPTY_BACKGROUND),
            paint: PixelBuffer::filled(size, UNPAINTED),
            cursor: PixelBuffer::transparent(size),
        }
    }
}

pub struct PaintSurface {
    config: SurfaceConfig,
    layers: Option<Layers>,
    state: PointerState,
    /// Size the surface is displayed at; `None` means 1:1 with the image.
    displayed: Option<(f32, f32)>,
}

impl PaintSurface {
    pub fn new(config: SurfaceConfig) -> Self {
        Self { config, layers: None, state: PointerState::Idle, displayed: None }
    }

    /// Create the layers at the default size with an unpainted paint layer.
    /// Mounting twice keeps the existing layers.
    pub fn mount(&mut self) {
        if self.layers.is_none() {
            debug!("mounting paint surface at {}", CanvasSize::DEFAULT);
            self.layers = Some(Layers::new(CanvasSize::DEFAULT));
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.layers.is_some()
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    pub fn state(&self) -> PointerState {
        self.state
    }

    pub fn size(&self) -> Option<CanvasSize> {
        self.layers.as_ref().map(|l| l.paint.size)
    }

    pub fn background(&self) -> Option<&PixelBuffer> {
        self.layers.as_ref().map(|l| &l.background)
    }

    /// The live paint layer. Hand this to whoever needs to export at will.
    pub fn paint_layer(&self) -> Option<&PixelBuffer> {
        self.layers.as_ref().map(|l| &l.paint)
    }

    pub fn cursor_layer(&self) -> Option<&PixelBuffer> {
        self.layers.as_ref().map(|l| &l.cursor)
    }

    pub fn set_cursor_size(&mut self, radius: u32) {
        self.config.cursor_size = radius.max(1);
    }

    pub fn set_mask_opacity(&mut self, opacity: f32) {
        self.config.mask_opacity = opacity.clamp(0.0, 1.0);
    }

    /// Change the tint. Already painted pixels are recolored; the red
    /// sentinel stays, so the mask itself does not change.
    pub fn set_mask_color(&mut self, color: Color) {
        self.config.mask_color = color;
        let Some(layers) = self.layers.as_mut() else { return };
        for px in layers.paint.data.chunks_exact_mut(4) {
            if codec::is_painted(px) {
                px[1] = color.g;
                px[2] = color.b;
            }
        }
    }

    /// Size the surface is shown at, in display pixels.
    pub fn set_displayed_size(&mut self, width: f32, height: f32) {
        self.displayed = Some((width, height));
    }

    pub fn mapper(&self) -> Option<CoordinateMapper> {
        let natural = self.size()?;
        Some(match self.displayed {
            Some(d) => CoordinateMapper::new(d, natural),
            None => CoordinateMapper::identity(natural),
        })
    }

    /// Resize all three layers. The background is refilled, the cursor is
    /// cleared, and the paint layer follows the reload policy.
    pub fn resize(&mut self, size: CanvasSize) {
        let reload = self.config.reload;
        let Some(layers) = self.layers.as_mut() else {
            debug!("resize to {size} skipped: surface not mounted");
            return;
        };
        if layers.paint.size != size {
            info!("resizing layers {} -> {size} ({reload:?} strokes)", layers.paint.size);
        }
        layers.background = PixelBuffer::filled(size, EMPTY_BACKGROUND);
        layers.cursor = PixelBuffer::transparent(size);
        layers.paint = match reload {
            ReloadPolicy::Preserve => layers.paint.resized(size, UNPAINTED),
            ReloadPolicy::Reset => PixelBuffer::filled(size, UNPAINTED),
        };
    }

    /// Resize to the image's natural size and draw it onto the background.
    pub fn load_image(&mut self, img: &RgbaImage) {
        if !self.is_mounted() {
            debug!("image load skipped: surface not mounted");
            return;
        }
        let (w, h) = img.dimensions();
        let Ok(size) = CanvasSize::new(w, h) else {
            debug!("image load skipped: empty image");
            return;
        };
        self.resize(size);
        if let Some(layers) = self.layers.as_mut() {
            layers.background.data.copy_from_slice(img.as_raw());
        }
        info!("loaded source image {size}");
    }

    /// Composite a filled circle onto the paint layer.
    pub fn draw_stroke(&mut self, stroke: BrushStroke) {
        let rgba = match stroke.color {
            PaintColor::Primary => codec::painted(self.config.mask_color),
            PaintColor::Secondary => UNPAINTED,
        };
        let Some(layers) = self.layers.as_mut() else { return };
        let (cx, cy) = stroke.center;
        fill_circle(&mut layers.paint, cx, cy, stroke.radius as f32, rgba);
    }

    /// Redraw the brush preview centered at an image-space point.
    pub fn preview_cursor(&mut self, x: f32, y: f32) {
        let tint = self.config.mask_color;
        let r = self.config.cursor_size as f32;
        let Some(layers) = self.layers.as_mut() else { return };
        layers.cursor.data.fill(0);
        fill_circle(&mut layers.cursor, x, y, r, tint.rgba(CURSOR_FILL_ALPHA));
        stroke_ring(&mut layers.cursor, x, y, r, tint.rgba(255));
    }

    pub fn clear_cursor(&mut self) {
        if let Some(layers) = self.layers.as_mut() {
            layers.cursor.data.fill(0);
        }
    }

    /// Wipe all strokes.
    pub fn clear_paint(&mut self) {
        if let Some(layers) = self.layers.as_mut() {
            layers.paint.fill(UNPAINTED);
        }
    }

    /// Turn the paint layer into a black/white mask and encode it.
    ///
    /// The paint layer is binarized in place, encoded, and restored before
    /// returning, so the visible strokes are byte-identical afterwards. With
    /// nothing painted the layer is cleared instead of going solid black and
    /// the artifact is a fully transparent image. Returns `None` when the
    /// surface is not mounted.
    pub fn export_mask(&mut self) -> Result<Option<MaskArtifact>> {
        let Some(layers) = self.layers.as_mut() else {
            debug!("mask export skipped: surface not mounted");
            return Ok(None);
        };

        let mut tx = PaintTransaction::begin(&mut layers.paint);
        let has_painted_pixels = codec::binarize(&mut tx.layer.data);
        if !has_painted_pixels {
            tx.layer.data.fill(0);
        }
        let data_url = codec::to_data_url(&*tx.layer)?;
        drop(tx);

        debug!("exported mask ({} bytes, painted: {has_painted_pixels})", data_url.len());
        Ok(Some(MaskArtifact { data_url, has_painted_pixels }))
    }

    /// The paint layer itself as a PNG data URL, strokes and tint included.
    pub fn paint_data_url(&self) -> Result<Option<String>> {
        match self.paint_layer() {
            Some(paint) => codec::to_data_url(paint).map(Some),
            None => Ok(None),
        }
    }

    /// Start receiving pointer events. Dropping the returned guard detaches:
    /// the preview is cleared and the state machine returns to `Idle`.
    pub fn subscribe(&mut self) -> Subscription<'_> {
        debug!("pointer listeners attached");
        Subscription { surface: self }
    }

    fn detach(&mut self) {
        debug!("pointer listeners detached");
        self.state = PointerState::Idle;
        self.clear_cursor();
    }

    fn handle(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Enter => {
                if self.state == PointerState::Idle {
                    self.state = PointerState::Hovering;
                }
            }
            PointerEvent::Leave => {
                self.state = PointerState::Idle;
                self.clear_cursor();
            }
            PointerEvent::Move { x, y, buttons, shift } => {
                if self.state == PointerState::Idle {
                    return;
                }
                self.state = if buttons.any() { PointerState::Painting } else { PointerState::Hovering };

                let Some((ix, iy)) = self.mapper().and_then(|m| m.map(x, y)) else { return };
                self.preview_cursor(ix, iy);

                if self.state == PointerState::Painting {
                    let color = if buttons.erases() || shift { PaintColor::Secondary } else { PaintColor::Primary };
                    self.draw_stroke(BrushStroke { center: (ix, iy), radius: self.config.cursor_size, color });
                }
            }
        }
    }
}

/// Scoped pointer subscription on a surface.
/// Events only reach the surface through this guard.
pub struct Subscription<'a> {
    surface: &'a mut PaintSurface,
}

impl Subscription<'_> {
    pub fn dispatch(&mut self, event: PointerEvent) {
        self.surface.handle(event);
    }
}

impl Deref for Subscription<'_> {
    type Target = PaintSurface;

    fn deref(&self) -> &PaintSurface {
        self.surface
    }
}

impl DerefMut for Subscription<'_> {
    fn deref_mut(&mut self) -> &mut PaintSurface {
        self.surface
    }
}

impl Drop for Subscription<'_> {
    fn drop(&mut self) {
        self.surface.detach();
    }
}

/// Snapshot of the paint layer that is written back on drop, including when
/// encoding bails out early with an error.
struct PaintTransaction<'a> {
    layer: &'a mut PixelBuffer,
    snapshot: Vec<u8>,
}

impl<'a> PaintTransaction<'a> {
    fn begin(layer: &'a mut PixelBuffer) -> Self {
        let snapshot = layer.data.clone();
        Self { layer, snapshot }
    }
}

impl Drop for PaintTransaction<'_> {
    fn drop(&mut self) {
        self.layer.data.copy_from_slice(&self.snapshot);
    }
}

/* ---------- Software drawing: anti-aliased discs and rings ---------- */

/// Source-over one RGBA color onto `dst`, scaled by `coverage`.
#[inline]
fn blend_over(dst: &mut [u8], src: [u8; 4], coverage: f32) {
    let sa = src[3] as f32 / 255.0 * coverage;
    if sa <= 0.0 {
        return;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return;
    }
    for c in 0..3 {
        let v = (src[c] as f32 * sa + dst[c] as f32 * da * (1.0 - sa)) / out_a;
        dst[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// Visit every pixel whose center is within `reach` of (cx,cy), passing the
/// distance from the center.
fn for_each_near(buf: &mut PixelBuffer, cx: f32, cy: f32, reach: f32, mut f: impl FnMut(&mut [u8], f32)) {
    let w = buf.size.width as i64;
    let h = buf.size.height as i64;
    let x0 = ((cx - reach).floor() as i64).max(0);
    let y0 = ((cy - reach).floor() as i64).max(0);
    let x1 = ((cx + reach).ceil() as i64).min(w - 1);
    let y1 = ((cy + reach).ceil() as i64).min(h - 1);
    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            let d = (dx * dx + dy * dy).sqrt();
            let i = ((y * w + x) * 4) as usize;
            f(&mut buf.data[i..i + 4], d);
        }
    }
}

/// Filled circle with a one pixel anti-aliased edge.
fn fill_circle(buf: &mut PixelBuffer, cx: f32, cy: f32, radius: f32, rgba: [u8; 4]) {
    if !(cx.is_finite() && cy.is_finite()) || radius <= 0.0 {
        return;
    }
    for_each_near(buf, cx, cy, radius + 1.0, |px, d| {
        let coverage = (radius + 0.5 - d).clamp(0.0, 1.0);
        if coverage > 0.0 {
            blend_over(px, rgba, coverage);
        }
    });
}

/// One pixel wide circle outline.
fn stroke_ring(buf: &mut PixelBuffer, cx: f32, cy: f32, radius: f32, rgba: [u8; 4]) {
    if !(cx.is_finite() && cy.is_finite()) || radius <= 0.0 {
        return;
    }
    for_each_near(buf, cx, cy, radius + 1.0, |px, d| {
        let coverage = (1.0 - (d - radius).abs()).clamp(0.0, 1.0);
        if coverage > 0.0 {
            blend_over(px, rgba, coverage);
        }
    });
}
