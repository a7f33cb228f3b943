// Window + software drawing utilities.
// 1) A window that shows the composited layers (image, tinted mask, brush preview).
// 2) Pointer/keyboard polling turned into the samples the surface consumes.
// 3) A tiny 5x7 bitmap font for the HUD line and the brush size indicator.

use crate::error::Error;
use crate::gamma::GammaLut;
use crate::input::{Buttons, PointerSample};
use crate::surface::PaintSurface;
use crate::types::FrameBuffer;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

pub struct Drawer {
    window: Window,
}

impl Drawer {
    /// Open a window of the given display size.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(60);
        Ok(Self { window })
    }

    /// Push the pixels for this frame to the screen.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))
    }

    /// Returns false when the user closes the window.
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Pointer position (None outside the window), held buttons and shift.
    pub fn pointer(&self) -> PointerSample {
        PointerSample {
            pos: self.window.get_mouse_pos(MouseMode::Discard),
            buttons: Buttons::from_flags(
                self.window.get_mouse_down(MouseButton::Left),
                self.window.get_mouse_down(MouseButton::Right),
                self.window.get_mouse_down(MouseButton::Middle),
            ),
            shift: self.window.is_key_down(Key::LeftShift) || self.window.is_key_down(Key::RightShift),
        }
    }

    /// Vertical wheel movement since the last frame, if any.
    pub fn scroll(&self) -> Option<f32> {
        self.window
            .get_scroll_wheel()
            .map(|(_, dy)| dy)
            .filter(|dy| *dy != 0.0)
    }

    // E: export mask + request
    pub fn e_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::E, KeyRepeat::No)
    }

    // C: wipe all strokes
    pub fn c_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::C, KeyRepeat::No)
    }

    // B: show/hide the brush size indicator
    pub fn b_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::B, KeyRepeat::No)
    }

    /// -1 for '[', +1 for ']', repeating while held.
    pub fn bracket_step(&self) -> i32 {
        let mut step = 0;
        if self.window.is_key_pressed(Key::LeftBracket, KeyRepeat::Yes) { step -= 1; }
        if self.window.is_key_pressed(Key::RightBracket, KeyRepeat::Yes) { step += 1; }
        step
    }
}

/* ---------- Compositing: background, tinted paint layer, cursor ---------- */

#[inline]
fn pack(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Render the surface into `fb`, sampling image pixels for each display pixel.
/// Paint coverage comes from the red channel; the tint comes from the config.
pub fn compose(surface: &PaintSurface, lut: &GammaLut, fb: &mut FrameBuffer) {
    let (Some(bg), Some(paint), Some(cursor), Some(mapper)) =
        (surface.background(), surface.paint_layer(), surface.cursor_layer(), surface.mapper())
    else {
        fb.pixels.fill(0);
        return;
    };
    let tint = surface.config().mask_color;
    let opacity = surface.config().mask_opacity;
    let (w, h) = (bg.size.width, bg.size.height);

    for dy in 0..fb.height {
        for dx in 0..fb.width {
            let out = &mut fb.pixels[dy * fb.width + dx];
            let Some((x, y)) = mapper.map(dx as f32 + 0.5, dy as f32 + 0.5) else {
                *out = 0;
                continue;
            };
            let x = (x.max(0.0) as u32).min(w - 1);
            let y = (y.max(0.0) as u32).min(h - 1);
            let i = (y as usize * w as usize + x as usize) * 4;

            let t = opacity * paint.data[i] as f32 / 255.0;
            let mut r = lut.mix(bg.data[i], tint.r, t);
            let mut g = lut.mix(bg.data[i + 1], tint.g, t);
            let mut b = lut.mix(bg.data[i + 2], tint.b, t);

            let ca = cursor.data[i + 3] as f32 / 255.0;
            if ca > 0.0 {
                r = lut.mix(r, cursor.data[i], ca);
                g = lut.mix(g, cursor.data[i + 1], ca);
                b = lut.mix(b, cursor.data[i + 2], ca);
            }
            *out = pack(r, g, b);
        }
    }
}

/* ---------- Software drawing: pixels, rectangles, tiny bitmap font ---------- */

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
#[inline]
fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = color;
}

/// Solid rectangle, clipped to the framebuffer.
pub fn fill_rect(fb: &mut FrameBuffer, x: i32, y: i32, w: i32, h: i32, color: u32) {
    for yy in y..y + h {
        for xx in x..x + w {
            put_pixel(fb, xx, yy, color);
        }
    }
}

/// Vertical size slider shown while the brush indicator is open.
pub fn draw_brush_indicator(fb: &mut FrameBuffer, value: u32, min: u32, max: u32) {
    let (x, y, w, h) = (8, 24, 12, 120);
    fill_rect(fb, x - 2, y - 2, w + 4, h + 4, 0x00_20_20_20);
    let span = (max - min).max(1) as f32;
    let filled = (((value.saturating_sub(min)) as f32 / span) * h as f32).round() as i32;
    fill_rect(fb, x, y + h - filled, w, filled, 0x00_FF_CC_33);
    draw_text_5x7(fb, x + w + 6, y + h - filled.max(7), &value.to_string(), 0x00_FF_FF_FF);
}

/// Return a 5x7 glyph bitmap. Each u8 is a row; bit 4 is the leftmost pixel.
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch.to_ascii_uppercase() {
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'H' => g!(0b10001,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'J' => g!(0b00111,0b00010,0b00010,0b00010,0b00010,0b10010,0b01100),
        'K' => g!(0b10001,0b10010,0b10100,0b11000,0b10100,0b10010,0b10001),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b10001,0b11001,0b10101,0b10011,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'Q' => g!(0b01110,0b10001,0b10001,0b10001,0b10101,0b10010,0b01101),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),
        'X' => g!(0b10001,0b10001,0b01010,0b00100,0b01010,0b10001,0b10001),
        'Y' => g!(0b10001,0b10001,0b01010,0b00100,0b00100,0b00100,0b00100),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),

        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),
        '/' => g!(0b00001,0b00010,0b00010,0b00100,0b01000,0b01000,0b10000),
        '-' => g!(0b00000,0b00000,0b00000,0b11111,0b00000,0b00000,0b00000),
        '[' => g!(0b01110,0b01000,0b01000,0b01000,0b01000,0b01000,0b01110),
        ']' => g!(0b01110,0b00010,0b00010,0b00010,0b00010,0b00010,0b01110),

        _ => None,
    }
}

/// Draw a single 5x7 character at (x,y) with a 1-pixel black shadow.
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, color: u32) {
    let Some(rows) = glyph5x7(ch) else { return };
    for (offset, c) in [(1, 0x00000000), (0, color)] {
        for (ry, rowbits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if (rowbits & (1 << (4 - rx))) != 0 {
                    put_pixel(fb, x + rx + offset, y + ry as i32 + offset, c);
                }
            }
        }
    }
}

/// Draw a text string using 5x7 glyphs, 1 pixel apart. Lowercase is drawn as uppercase.
pub fn draw_text_5x7(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, color: u32) {
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, color);
        x += 6;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::SurfaceConfig;
    use crate::types::{BrushStroke, Color, PaintColor};
    use image::{Rgba, RgbaImage};

    fn surface(opacity: f32) -> PaintSurface {
        let mut s = PaintSurface::new(SurfaceConfig {
            cursor_size: 1,
            mask_color: Color::rgb(0, 0, 255),
            mask_opacity: opacity,
            ..Default::default()
        });
        s.mount();
        s.load_image(&RgbaImage::from_pixel(4, 4, Rgba([200, 100, 50, 255])));
        s
    }

    #[test]
    fn test_unpainted_shows_background() {
        let s = surface(1.0);
        let lut = GammaLut::new();
        let mut fb = FrameBuffer::new(4, 4);
        compose(&s, &lut, &mut fb);
        assert!(fb.pixels.iter().all(|&p| p == pack(200, 100, 50)));
    }

    #[test]
    fn test_painted_shows_tint() {
        let mut s = surface(1.0);
        s.draw_stroke(BrushStroke { center: (0.5, 0.5), radius: 1, color: PaintColor::Primary });
        let lut = GammaLut::new();
        let mut fb = FrameBuffer::new(4, 4);
        compose(&s, &lut, &mut fb);
        assert_eq!(fb.pixels[0], pack(0, 0, 255));
        assert_eq!(fb.pixels[15], pack(200, 100, 50));
    }

    #[test]
    fn test_downscaled_display_samples_image() {
        let mut s = surface(1.0);
        s.draw_stroke(BrushStroke { center: (3.5, 3.5), radius: 1, color: PaintColor::Primary });
        s.set_displayed_size(2.0, 2.0);
        let lut = GammaLut::new();
        let mut fb = FrameBuffer::new(2, 2);
        compose(&s, &lut, &mut fb);
        assert_eq!(fb.pixels[3], pack(0, 0, 255));
        assert_eq!(fb.pixels[0], pack(200, 100, 50));
    }

    #[test]
    fn test_unmounted_composes_black() {
        let s = PaintSurface::new(SurfaceConfig::default());
        let mut fb = FrameBuffer::new(2, 2);
        fb.pixels.fill(0x00FFFFFF);
        compose(&s, &GammaLut::new(), &mut fb);
        assert!(fb.pixels.iter().all(|&p| p == 0));
    }

    #[test]
    fn test_text_is_clipped() {
        let mut fb = FrameBuffer::new(10, 10);
        draw_text_5x7(&mut fb, 6, 6, "Mask", 0x00FFFFFF);
        assert!(fb.pixels.iter().any(|&p| p == 0x00FFFFFF));
    }
}
