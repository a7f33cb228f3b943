// What you SEE:
// • The source image (or a blank black canvas) with your mask tinted on top.
// • Hold Left Mouse: paint the mask. Right Mouse or Shift+Left: erase.
// • Scroll or [ / ]: brush size (indicator closes itself). B toggles it.
// • E exports mask + request to --out. C clears the mask. ESC quits.

use clap::Parser;
use log::{debug, error, info, warn};
use mask_painter::brush::{BrushSize, MAX_BRUSH, MIN_BRUSH};
use mask_painter::codec;
use mask_painter::config::Cli;
use mask_painter::coords::fit_within;
use mask_painter::draw::{compose, draw_brush_indicator, draw_text_5x7, Drawer};
use mask_painter::error::Error;
use mask_painter::gamma::GammaLut;
use mask_painter::input::PointerTracker;
use mask_painter::submit::{EditMode, EditRequest, SubmitError};
use mask_painter::surface::{PaintSurface, PointerState};
use mask_painter::types::FrameBuffer;
use image::{Rgba, RgbaImage};
use std::fs;
use std::time::{Duration, Instant};

/// Brush radius change per scroll notch.
const SCROLL_STEP: i32 = 5;
/// How long export feedback stays on the HUD.
const FLASH_FOR: Duration = Duration::from_secs(2);

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    /* --- Source image ---
       Edit mode keeps the original bytes for the request; scribble mode starts from black. */
    let (source, mode) = match &cli.image {
        Some(path) => {
            let bytes = fs::read(path)?;
            let img = image::load_from_memory(&bytes)?.to_rgba8();
            let mime = image::guess_format(&bytes).map(|f| f.to_mime_type()).unwrap_or("image/png");
            info!("editing {} ({}x{})", path.display(), img.width(), img.height());
            (img, EditMode::Edit { source: codec::bytes_to_data_url(mime, &bytes) })
        }
        None => {
            info!("scribbling on a blank {} canvas", cli.size);
            (RgbaImage::from_pixel(cli.size.width, cli.size.height, Rgba([0, 0, 0, 255])), EditMode::Scribble)
        }
    };

    /* --- Surface + window ---
       The window fits inside --max-display; pointer offsets are scaled back to image pixels. */
    let mut surface = PaintSurface::new(cli.surface_config());
    surface.mount();
    surface.load_image(&source);
    let Some(image_size) = surface.size() else {
        return Err(Error::InvalidSize("surface failed to mount".into()));
    };
    let display = fit_within(image_size, cli.max_display);
    surface.set_displayed_size(display.width as f32, display.height as f32);

    let title = if cli.is_scribble() { "Mask Painter - Scribble" } else { "Mask Painter - Edit" };
    let mut drawer = Drawer::new(title, display.width as usize, display.height as usize)?;
    let mut screen = FrameBuffer::new(display.width as usize, display.height as usize);

    let lut = GammaLut::new();
    let mut brush = BrushSize::new(cli.initial_brush_size());
    let mut tracker = PointerTracker::new();
    let mut flash: Option<(String, Instant)> = None;

    /* --- FPS (debug log only) --- */
    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;

    // Pointer events reach the surface only while this subscription lives.
    let mut editor = surface.subscribe();

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        let now = Instant::now();

        /* 1) Brush size: wheel, bracket keys, B to show/hide the indicator. */
        if drawer.b_pressed_once() {
            brush.toggle();
        }
        let mut step = drawer.bracket_step();
        if let Some(dy) = drawer.scroll() {
            step += dy.signum() as i32 * SCROLL_STEP;
        }
        if step != 0 && brush.step(step, now) {
            editor.set_cursor_size(brush.value());
        }
        brush.tick(now);

        /* 2) Clear */
        if drawer.c_pressed_once() {
            editor.clear_paint();
            info!("mask cleared");
        }

        /* 3) Pointer: enter / move / leave drive painting and the brush preview. */
        for event in tracker.update(drawer.pointer()) {
            editor.dispatch(event);
        }

        /* 4) Export: mask must be non-empty and a prompt given. */
        if drawer.e_pressed_once() {
            let message = match EditRequest::prepare(mode.clone(), &cli.prompt, cli.negative_prompt.as_deref(), &mut editor) {
                Ok(request) => match request.write_to(&cli.out) {
                    Ok(_) => "exported".to_string(),
                    Err(e) => {
                        error!("export failed: {e}");
                        "export failed".to_string()
                    }
                },
                Err(SubmitError::Editor(e)) => {
                    error!("export failed: {e}");
                    "export failed".to_string()
                }
                Err(e) => {
                    warn!("export refused: {e}");
                    e.to_string()
                }
            };
            flash = Some((message, now));
        }

        /* 5) Composite layers, then HUD on top. */
        compose(&editor, &lut, &mut screen);

        let state = match editor.state() {
            PointerState::Idle => "IDLE",
            PointerState::Hovering => "HOVER",
            PointerState::Painting => "PAINT",
        };
        let hud = format!("{state} | LMB PAINT  RMB/SHIFT ERASE  [ ] SIZE  E EXPORT  C CLEAR");
        draw_text_5x7(&mut screen, 8, 8, &hud, 0x00_FF_FF_FF);

        if brush.is_open() {
            draw_brush_indicator(&mut screen, brush.value(), MIN_BRUSH, MAX_BRUSH);
        }
        if flash.as_ref().is_some_and(|(_, at)| now.duration_since(*at) >= FLASH_FOR) {
            flash = None;
        }
        if let Some((message, _)) = &flash {
            let bottom = screen.height as i32 - 16;
            draw_text_5x7(&mut screen, 8, bottom, message, 0x00_FF_CC_33);
        }

        /* 6) Present */
        drawer.present(&screen)?;

        /* 7) FPS */
        frames_this_second += 1;
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let fps = frames_this_second as f32 / now.duration_since(last_fps_time).as_secs_f32();
            debug!("FPS: {fps:.1}");
            frames_this_second = 0;
            last_fps_time = now;
        }
    }

    drop(editor);
    info!("bye");
    Ok(())
}
