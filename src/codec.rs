//! Pixel buffer codec: paint layer -> binary mask, PNG, and data URLs.
//!
//! The paint layer encodes "is this pixel masked" in the red channel alone:
//! red == 255 means painted, anything else means unpainted. Green and blue
//! only carry the display tint, so the tint can change without touching the
//! mask.

use crate::error::{Error, Result};
use crate::types::{Color, PixelBuffer};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};

/// Red channel value that marks a painted pixel.
pub const PAINTED_RED: u8 = 255;

/// Opaque fill of a paint layer nobody has drawn on yet.
pub const UNPAINTED: [u8; 4] = [0, 0, 0, 255];

pub const MASK_WHITE: [u8; 4] = [255, 255, 255, 255];
pub const MASK_BLACK: [u8; 4] = [0, 0, 0, 255];

const PNG_PREFIX: &str = "data:image/png;base64,";

/// Paint-layer value for a painted pixel shown in `tint`.
#[inline]
pub fn painted(tint: Color) -> [u8; 4] {
    [PAINTED_RED, tint.g, tint.b, 255]
}

#[inline]
pub fn is_painted(px: &[u8]) -> bool {
    px[0] == PAINTED_RED
}

/// Rewrites `data` (RGBA8) into a strict black/white mask in place.
/// Returns true if at least one pixel was painted.
pub fn binarize(data: &mut [u8]) -> bool {
    let mut any = false;
    for px in data.chunks_exact_mut(4) {
        if is_painted(px) {
            any = true;
            px.copy_from_slice(&MASK_WHITE);
        } else {
            px.copy_from_slice(&MASK_BLACK);
        }
    }
    any
}

/// True if any pixel of the buffer carries the painted sentinel.
pub fn has_painted_pixels(data: &[u8]) -> bool {
    data.chunks_exact(4).any(is_painted)
}

/// PNG-encode an RGBA buffer.
pub fn encode_png(buf: &PixelBuffer) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(&buf.data, buf.size.width, buf.size.height, ExtendedColorType::Rgba8)
        .map_err(|e| Error::ImageEncode(e.to_string()))?;
    Ok(out)
}

/// `data:image/png;base64,...` for the buffer.
pub fn to_data_url(buf: &PixelBuffer) -> Result<String> {
    let png = encode_png(buf)?;
    Ok(format!("{PNG_PREFIX}{}", B64.encode(png)))
}

/// Split a `data:<mime>;base64,<payload>` URL and decode the payload bytes.
pub fn data_url_bytes(url: &str) -> Result<(String, Vec<u8>)> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| Error::DataUrl("missing data: scheme".into()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| Error::DataUrl("missing ',' separator".into()))?;
    let mime = meta
        .strip_suffix(";base64")
        .ok_or_else(|| Error::DataUrl("missing base64 marker".into()))?;
    let bytes = B64
        .decode(payload.trim())
        .map_err(|e| Error::DataUrl(format!("base64: {e}")))?;
    Ok((mime.to_string(), bytes))
}

/// Decode an image data URL (PNG, JPEG or WebP payload) into RGBA.
pub fn decode_data_url(url: &str) -> Result<RgbaImage> {
    let (_mime, bytes) = data_url_bytes(url)?;
    Ok(image::load_from_memory(&bytes)?.to_rgba8())
}

/// Wrap an already-encoded image as a data URL with the given MIME type.
pub fn bytes_to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", B64.encode(bytes))
}
