// Core types shared by the codec, the paint surface and the window.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Pixel dimensions of the working image. Same for all three layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    /// Size the surface starts with before any image is loaded.
    pub const DEFAULT: CanvasSize = CanvasSize { width: 1024, height: 1024 };

    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidSize(format!("{width}x{height}")));
        }
        Ok(Self { width, height })
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl fmt::Display for CanvasSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for CanvasSize {
    type Err = Error;

    /// Parses `WxH`, e.g. `1024x768`.
    fn from_str(s: &str) -> Result<Self> {
        let bad = || Error::InvalidSize(s.to_string());
        let (w, h) = s.trim().split_once(['x', 'X']).ok_or_else(bad)?;
        let w = w.trim().parse::<u32>().map_err(|_| bad())?;
        let h = h.trim().parse::<u32>().map_err(|_| bad())?;
        CanvasSize::new(w, h).map_err(|_| bad())
    }
}

/// RGBA8 pixel buffer, row-major, 4 bytes per pixel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    pub size: CanvasSize,
    pub data: Vec<u8>, // length = width * height * 4
}

impl PixelBuffer {
    /// A buffer where every pixel is `rgba`.
    pub fn filled(size: CanvasSize, rgba: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(size.pixel_count() * 4);
        for _ in 0..size.pixel_count() {
            data.extend_from_slice(&rgba);
        }
        Self { size, data }
    }

    /// Fully transparent black, like a freshly cleared canvas.
    pub fn transparent(size: CanvasSize) -> Self {
        Self { size, data: vec![0; size.pixel_count() * 4] }
    }

    pub fn fill(&mut self, rgba: [u8; 4]) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        Some((y as usize * self.size.width as usize + x as usize) * 4)
    }

    /// Pixel at (x,y), or `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let i = self.offset(x, y)?;
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    /// Writes the pixel at (x,y); out-of-bounds writes are dropped.
    pub fn put_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if let Some(i) = self.offset(x, y) {
            self.data[i..i + 4].copy_from_slice(&rgba);
        }
    }

    /// A new buffer of `size` filled with `fill`, with the overlapping
    /// top-left region copied over from `self`.
    pub fn resized(&self, size: CanvasSize, fill: [u8; 4]) -> Self {
        let mut out = Self::filled(size, fill);
        let w = self.size.width.min(size.width) as usize;
        let h = self.size.height.min(size.height);
        for y in 0..h {
            let src = (y as usize * self.size.width as usize) * 4;
            let dst = (y as usize * size.width as usize) * 4;
            out.data[dst..dst + w * 4].copy_from_slice(&self.data[src..src + w * 4]);
        }
        out
    }
}

/// An sRGB color parsed from a CSS hex string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn rgba(&self, a: u8) -> [u8; 4] {
        [self.r, self.g, self.b, a]
    }
}

impl FromStr for Color {
    type Err = Error;

    /// Accepts `#rgb`, `#rrggbb` and `#rrggbbaa` (alpha is ignored).
    fn from_str(s: &str) -> Result<Self> {
        let bad = || Error::InvalidColor(s.to_string());
        let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());
        if !hex.is_ascii() {
            return Err(bad());
        }
        let channel = |h: &str| u8::from_str_radix(h, 16).map_err(|_| bad());
        match hex.len() {
            3 => {
                let digits: Vec<u8> = hex
                    .chars()
                    .map(|c| c.to_digit(16).map(|d| d as u8 * 17).ok_or_else(bad))
                    .collect::<Result<_>>()?;
                Ok(Color::rgb(digits[0], digits[1], digits[2]))
            }
            6 | 8 => Ok(Color::rgb(channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
            _ => Err(bad()),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Which of the two paint colors a stroke uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaintColor {
    /// Marks pixels as part of the mask.
    Primary,
    /// Erases back to the unpainted sentinel.
    Secondary,
}

/// A filled circle to composite onto the paint layer. Center is in image pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrushStroke {
    pub center: (f32, f32),
    pub radius: u32,
    pub color: PaintColor,
}

/// Result of exporting the paint layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaskArtifact {
    /// `data:image/png;base64,...`; a fully transparent image when nothing was painted.
    pub data_url: String,
    pub has_painted_pixels: bool,
}

/// What the window shows: each entry is 0x00RRGGBB for minifb.
#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0; width * height] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!("512x256".parse::<CanvasSize>().unwrap(), CanvasSize { width: 512, height: 256 });
        assert_eq!(" 8X8 ".parse::<CanvasSize>().unwrap(), CanvasSize { width: 8, height: 8 });
        assert!("0x10".parse::<CanvasSize>().is_err());
        assert!("512".parse::<CanvasSize>().is_err());
        assert!("axb".parse::<CanvasSize>().is_err());
    }

    #[test]
    fn test_parse_color() {
        assert_eq!("#23272d".parse::<Color>().unwrap(), Color::rgb(0x23, 0x27, 0x2d));
        assert_eq!("#fff".parse::<Color>().unwrap(), Color::rgb(255, 255, 255));
        assert_eq!("#23272d88".parse::<Color>().unwrap(), Color::rgb(0x23, 0x27, 0x2d));
        assert!("#12345".parse::<Color>().is_err());
        assert!("#gggggg".parse::<Color>().is_err());
        assert_eq!(Color::rgb(1, 2, 255).to_string(), "#0102ff");
    }

    #[test]
    fn test_resized_keeps_overlap() {
        let size = CanvasSize::new(2, 2).unwrap();
        let mut buf = PixelBuffer::filled(size, [0, 0, 0, 255]);
        buf.put_pixel(1, 1, [255, 1, 2, 255]);

        let grown = buf.resized(CanvasSize::new(3, 3).unwrap(), [9, 9, 9, 255]);
        assert_eq!(grown.pixel(1, 1), Some([255, 1, 2, 255]));
        assert_eq!(grown.pixel(0, 0), Some([0, 0, 0, 255]));
        assert_eq!(grown.pixel(2, 2), Some([9, 9, 9, 255]));

        let shrunk = grown.resized(CanvasSize::new(1, 1).unwrap(), [9, 9, 9, 255]);
        assert_eq!(shrunk.data, vec![0, 0, 0, 255]);
    }

    #[test]
    fn test_put_pixel_out_of_bounds_is_dropped() {
        let mut buf = PixelBuffer::transparent(CanvasSize::new(1, 1).unwrap());
        buf.put_pixel(5, 0, [1, 1, 1, 1]);
        assert_eq!(buf.data, vec![0, 0, 0, 0]);
        assert_eq!(buf.pixel(0, 5), None);
    }
}
