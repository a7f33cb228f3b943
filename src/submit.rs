//! Edit submission: validate what the user drew and package it, together
//! with the prompt, as a request for an image-editing API.
//!
//! The request is written to disk instead of being sent anywhere; whatever
//! forwards it upstream owns authentication and the wire protocol.

use crate::codec;
use crate::error::Error;
use crate::surface::PaintSurface;
use log::info;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// What the painted layer means to the receiver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditMode {
    /// Inpaint/outpaint `source` where the mask is white.
    Edit { source: String },
    /// Generate from the scribble itself on a blank canvas.
    Scribble,
}

/// Why a submission was refused.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("please draw something first")]
    NothingDrawn,

    #[error("please enter a prompt")]
    MissingPrompt,

    #[error("the paint surface is not mounted yet")]
    NotMounted,

    #[error(transparent)]
    Editor(#[from] Error),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum EditRequest {
    Edit {
        prompt: String,
        #[serde(rename = "negativePrompt", skip_serializing_if = "Option::is_none")]
        negative_prompt: Option<String>,
        /// Source image data URL.
        image: String,
        /// Binary mask data URL, white = editable.
        mask: String,
    },
    Scribble {
        prompt: String,
        #[serde(rename = "negativePrompt", skip_serializing_if = "Option::is_none")]
        negative_prompt: Option<String>,
        /// The raw paint layer as a data URL.
        scribble: String,
    },
}

impl EditRequest {
    /// Validate the surface and prompt and build the request.
    /// The mask is checked first, like the dialog does.
    pub fn prepare(
        mode: EditMode,
        prompt: &str,
        negative_prompt: Option<&str>,
        surface: &mut PaintSurface,
    ) -> Result<Self, SubmitError> {
        let mask = surface.export_mask()?.ok_or(SubmitError::NotMounted)?;
        if !mask.has_painted_pixels {
            return Err(SubmitError::NothingDrawn);
        }
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(SubmitError::MissingPrompt);
        }
        let prompt = prompt.to_string();
        let negative_prompt = negative_prompt
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        Ok(match mode {
            EditMode::Edit { source } => EditRequest::Edit { prompt, negative_prompt, image: source, mask: mask.data_url },
            EditMode::Scribble => {
                let scribble = surface.paint_data_url()?.ok_or(SubmitError::NotMounted)?;
                EditRequest::Scribble { prompt, negative_prompt, scribble }
            }
        })
    }

    pub fn prompt(&self) -> &str {
        match self {
            EditRequest::Edit { prompt, .. } | EditRequest::Scribble { prompt, .. } => prompt,
        }
    }

    /// Write `request.json` plus the mask (or scribble) as a PNG into `dir`.
    /// Returns the path of the JSON file.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, Error> {
        fs::create_dir_all(dir)?;

        let (name, url) = match self {
            EditRequest::Edit { mask, .. } => ("mask.png", mask),
            EditRequest::Scribble { scribble, .. } => ("scribble.png", scribble),
        };
        let (_mime, png) = codec::data_url_bytes(url)?;
        let image_path = dir.join(name);
        fs::write(&image_path, png)?;

        let json_path = dir.join("request.json");
        fs::write(&json_path, serde_json::to_vec_pretty(self)?)?;

        info!("wrote {} and {}", json_path.display(), image_path.display());
        Ok(json_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::SurfaceConfig;
    use crate::types::{BrushStroke, CanvasSize, PaintColor};

    fn surface_with_stroke(paint: bool) -> PaintSurface {
        let mut s = PaintSurface::new(SurfaceConfig::default());
        s.mount();
        s.resize(CanvasSize::new(16, 16).unwrap());
        if paint {
            s.draw_stroke(BrushStroke { center: (8.0, 8.0), radius: 3, color: PaintColor::Primary });
        }
        s
    }

    fn edit() -> EditMode {
        EditMode::Edit { source: "data:image/png;base64,AAAA".into() }
    }

    #[test]
    fn test_nothing_drawn_is_refused_first() {
        let mut s = surface_with_stroke(false);
        let err = EditRequest::prepare(edit(), "", None, &mut s).unwrap_err();
        assert!(matches!(err, SubmitError::NothingDrawn));
        assert_eq!(err.to_string(), "please draw something first");
    }

    #[test]
    fn test_blank_prompt_is_refused() {
        let mut s = surface_with_stroke(true);
        let err = EditRequest::prepare(edit(), "   ", None, &mut s).unwrap_err();
        assert!(matches!(err, SubmitError::MissingPrompt));
    }

    #[test]
    fn test_unmounted_surface() {
        let mut s = PaintSurface::new(SurfaceConfig::default());
        let err = EditRequest::prepare(EditMode::Scribble, "cat", None, &mut s).unwrap_err();
        assert!(matches!(err, SubmitError::NotMounted));
    }

    #[test]
    fn test_edit_request_json() {
        let mut s = surface_with_stroke(true);
        let req = EditRequest::prepare(edit(), " a red door ", Some(" "), &mut s).unwrap();
        assert_eq!(req.prompt(), "a red door");

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["mode"], "edit");
        assert_eq!(json["image"], "data:image/png;base64,AAAA");
        assert!(json["mask"].as_str().unwrap().starts_with("data:image/png;base64,"));
        assert!(json.get("negativePrompt").is_none());
    }

    #[test]
    fn test_scribble_request_carries_paint_layer() {
        let mut s = surface_with_stroke(true);
        let req = EditRequest::prepare(EditMode::Scribble, "a boat", Some("blurry"), &mut s).unwrap();
        let EditRequest::Scribble { scribble, negative_prompt, .. } = &req else {
            panic!("expected scribble request");
        };
        assert_eq!(negative_prompt.as_deref(), Some("blurry"));
        let img = codec::decode_data_url(scribble).unwrap();
        assert_eq!(img.get_pixel(8, 8).0, codec::painted(SurfaceConfig::default().mask_color));
    }

    #[test]
    fn test_write_to_dir() {
        let dir = std::env::temp_dir().join(format!("mask-painter-submit-{}", std::process::id()));
        let mut s = surface_with_stroke(true);
        let req = EditRequest::prepare(edit(), "door", None, &mut s).unwrap();

        let json_path = req.write_to(&dir).unwrap();
        let text = fs::read_to_string(&json_path).unwrap();
        assert!(text.contains("\"prompt\": \"door\""));

        let mask = image::open(dir.join("mask.png")).unwrap().to_rgba8();
        assert_eq!(mask.dimensions(), (16, 16));
        assert_eq!(mask.get_pixel(8, 8).0, codec::MASK_WHITE);
        assert_eq!(mask.get_pixel(0, 0).0, codec::MASK_BLACK);

        fs::remove_dir_all(&dir).unwrap();
    }
}
