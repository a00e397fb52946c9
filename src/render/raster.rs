//! Cairo-based rasterization of element subtrees.

use std::fs::File;

use async_trait::async_trait;

use crate::dom::{Color, Element, color::BLACK};
use crate::export::{
    dependencies::RasterCapture,
    types::{CaptureOptions, ExportError, PixelBuffer},
};

/// Padding between an element's box and its text, in CSS pixels.
const TEXT_PADDING: f64 = 12.0;
const DEFAULT_FONT_SIZE: f64 = 16.0;
/// Largest surface edge cairo accepts.
const MAX_SURFACE_EDGE: f64 = 32_767.0;

/// Default [`RasterCapture`] rendering through cairo and pango.
#[derive(Debug, Clone, Copy, Default)]
pub struct CairoRasterizer;

#[async_trait]
impl RasterCapture for CairoRasterizer {
    async fn capture(
        &self,
        subtree: &Element,
        options: &CaptureOptions,
    ) -> Result<PixelBuffer, ExportError> {
        let subtree = subtree.clone();
        let options = *options;
        tokio::task::spawn_blocking(move || render_png(&subtree, &options))
            .await
            .map_err(|e| ExportError::Task(format!("Raster task failed: {}", e)))?
    }
}

/// Renders `subtree` from its own origin into a PNG.
///
/// The output is `options.width × options.height` CSS pixels multiplied by
/// `options.scale`. Images that cannot be loaded are skipped with a warning.
pub fn render_png(subtree: &Element, options: &CaptureOptions) -> Result<PixelBuffer, ExportError> {
    let px_width = surface_edge(options.width * options.scale)?;
    let px_height = surface_edge(options.height * options.scale)?;

    let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, px_width, px_height)
        .map_err(|e| ExportError::Capture(format!("Failed to create surface: {}", e)))?;
    {
        let ctx = cairo::Context::new(&surface)
            .map_err(|e| ExportError::Capture(format!("Failed to create context: {}", e)))?;
        ctx.scale(options.scale, options.scale);

        if let Some(background) = options.background.filter(Color::is_visible) {
            ctx.set_source_rgba(background.r, background.g, background.b, background.a);
            ctx.paint()
                .map_err(|e| ExportError::Capture(format!("Background fill failed: {}", e)))?;
        }

        ctx.rectangle(0.0, 0.0, options.width, options.height);
        ctx.clip();
        render_contents(&ctx, subtree, 0.0, 0.0);
    }

    surface.flush();
    let mut png = Vec::new();
    surface
        .write_to_png(&mut png)
        .map_err(|e| ExportError::Image(format!("PNG encoding failed: {}", e)))?;

    Ok(PixelBuffer {
        width: px_width as u32,
        height: px_height as u32,
        png,
    })
}

fn surface_edge(length: f64) -> Result<i32, ExportError> {
    let edge = length.ceil().max(1.0);
    if !edge.is_finite() || edge > MAX_SURFACE_EDGE {
        return Err(ExportError::Capture(format!(
            "capture edge of {length} px exceeds the raster limit"
        )));
    }
    Ok(edge as i32)
}

/// Draws an element whose box starts at (`x`, `y`), then its children.
fn render_contents(ctx: &cairo::Context, element: &Element, x: f64, y: f64) {
    let (width, height) = element.box_size();
    let _ = ctx.save();

    if let Some(fill) = element.background.as_deref().and_then(Color::parse) {
        ctx.set_source_rgba(fill.r, fill.g, fill.b, fill.a);
        ctx.rectangle(x, y, width, height);
        let _ = ctx.fill();
    }

    if let Some(path) = &element.image {
        render_image(ctx, path, x, y, width, height);
    }

    if let Some(text) = element.text.as_deref().filter(|t| !t.is_empty()) {
        let color = element
            .color
            .as_deref()
            .and_then(Color::parse)
            .unwrap_or(BLACK);
        let size = element.font_size.unwrap_or(DEFAULT_FONT_SIZE);
        render_text(ctx, text, x, y, width, size, color);
    }

    if element.clips_overflow() {
        ctx.rectangle(x, y, width, height);
        ctx.clip();
    }

    for child in &element.children {
        let (dx, dy) = child.offset();
        render_contents(ctx, child, x + dx, y + dy);
    }

    let _ = ctx.restore();
}

fn render_image(ctx: &cairo::Context, path: &std::path::Path, x: f64, y: f64, w: f64, h: f64) {
    let image = File::open(path)
        .map_err(|e| e.to_string())
        .and_then(|mut file| {
            cairo::ImageSurface::create_from_png(&mut file).map_err(|e| e.to_string())
        });
    let image = match image {
        Ok(image) if image.width() > 0 && image.height() > 0 => image,
        Ok(_) => return,
        Err(e) => {
            log::warn!("Skipping image {}: {}", path.display(), e);
            return;
        }
    };

    let _ = ctx.save();
    ctx.translate(x, y);
    ctx.scale(w / image.width() as f64, h / image.height() as f64);
    if ctx.set_source_surface(&image, 0.0, 0.0).is_ok() {
        let _ = ctx.paint();
    }
    let _ = ctx.restore();
}

fn render_text(
    ctx: &cairo::Context,
    text: &str,
    x: f64,
    y: f64,
    width: f64,
    size: f64,
    color: Color,
) {
    let layout = pangocairo::functions::create_layout(ctx);
    let font_desc = pango::FontDescription::from_string(&format!("Sans {}", size));
    layout.set_font_description(Some(&font_desc));
    layout.set_text(text);

    let wrap_width = (width - 2.0 * TEXT_PADDING).max(1.0);
    layout.set_width((wrap_width * pango::SCALE as f64) as i32);
    layout.set_wrap(pango::WrapMode::WordChar);

    ctx.set_source_rgba(color.r, color.g, color.b, color.a);
    ctx.move_to(x + TEXT_PADDING, y + TEXT_PADDING);
    pangocairo::functions::show_layout(ctx, &layout);
}
