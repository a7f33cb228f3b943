//! Command line configuration.

use crate::brush::{EDIT_DEFAULT, SCRIBBLE_DEFAULT};
use crate::surface::{ReloadPolicy, SurfaceConfig};
use crate::types::{CanvasSize, Color};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mask-painter")]
#[command(about = "Paint an inpainting mask over an image and export it with a prompt")]
#[command(version)]
pub struct Cli {
    /// Source image to paint a mask on. Without it you scribble on a blank canvas.
    #[arg(short, long)]
    pub image: Option<PathBuf>,

    /// Blank canvas size when no image is given
    #[arg(long, default_value = "1024x1024")]
    pub size: CanvasSize,

    /// Brush radius in image pixels (5-250). Defaults to 50 for images, 10 for scribbles.
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(5..=250))]
    pub brush_size: Option<u32>,

    /// Tint of the painted mask and the brush preview
    #[arg(long, default_value = "#23272d")]
    pub mask_color: Color,

    /// On-screen opacity of the painted mask (0-1)
    #[arg(long, default_value_t = 0.85)]
    pub mask_opacity: f32,

    /// Prompt sent along with the mask
    #[arg(short, long, default_value = "")]
    pub prompt: String,

    /// Optional negative prompt
    #[arg(long)]
    pub negative_prompt: Option<String>,

    /// Directory the request and mask are written to
    #[arg(short, long, default_value = ".")]
    pub out: PathBuf,

    /// Wipe strokes when a new image is loaded instead of keeping them
    #[arg(long)]
    pub reset_on_load: bool,

    /// Largest window size; bigger images are shown scaled down
    #[arg(long, default_value = "1024x768")]
    pub max_display: CanvasSize,
}

impl Cli {
    pub fn is_scribble(&self) -> bool {
        self.image.is_none()
    }

    pub fn initial_brush_size(&self) -> u32 {
        self.brush_size
            .unwrap_or(if self.is_scribble() { SCRIBBLE_DEFAULT } else { EDIT_DEFAULT })
    }

    pub fn surface_config(&self) -> SurfaceConfig {
        SurfaceConfig {
            cursor_size: self.initial_brush_size(),
            mask_color: self.mask_color,
            mask_opacity: self.mask_opacity.clamp(0.0, 1.0),
            reload: if self.reset_on_load { ReloadPolicy::Reset } else { ReloadPolicy::Preserve },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_scribble() {
        let cli = Cli::try_parse_from(["mask-painter"]).unwrap();
        assert!(cli.is_scribble());
        assert_eq!(cli.size, CanvasSize::DEFAULT);
        assert_eq!(cli.initial_brush_size(), SCRIBBLE_DEFAULT);
        let cfg = cli.surface_config();
        assert_eq!(cfg, SurfaceConfig::default());
    }

    #[test]
    fn test_image_defaults_and_overrides() {
        let cli = Cli::try_parse_from(["mask-painter", "--image", "cat.png", "--mask-color", "#ff0000", "--reset-on-load"]).unwrap();
        assert_eq!(cli.initial_brush_size(), EDIT_DEFAULT);
        let cfg = cli.surface_config();
        assert_eq!(cfg.mask_color, Color::rgb(255, 0, 0));
        assert_eq!(cfg.reload, ReloadPolicy::Reset);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Cli::try_parse_from(["mask-painter", "--brush-size", "300"]).is_err());
        assert!(Cli::try_parse_from(["mask-painter", "--size", "0x10"]).is_err());
        assert!(Cli::try_parse_from(["mask-painter", "--mask-color", "red"]).is_err());
    }
}
