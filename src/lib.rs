//! Interactive mask painting for image inpainting/outpainting.
//!
//! A [`surface::PaintSurface`] holds three layers (source image, paint,
//! brush preview). Pointer events paint filled circles onto the paint layer,
//! and [`surface::PaintSurface::export_mask`] turns it into a black/white PNG
//! data URL without disturbing what the user sees.

pub mod brush;
pub mod codec;
pub mod config;
pub mod coords;
pub mod draw;
pub mod error;
pub mod gamma;
pub mod input;
pub mod submit;
pub mod surface;
pub mod types;

pub use error::{Error, Result};
pub use surface::{PaintSurface, PointerState, ReloadPolicy, SurfaceConfig};
pub use types::{BrushStroke, CanvasSize, Color, MaskArtifact, PaintColor, PixelBuffer};
