//! PDF output through cairo's PDF surface.

use std::io::Cursor;

use crate::export::{
    dependencies::{DocumentBackend, DocumentWriter},
    planner::PageSetup,
    types::{ExportError, PixelBuffer},
};

const POINTS_PER_MM: f64 = 72.0 / 25.4;

fn mm_to_pt(mm: f64) -> f64 {
    mm * POINTS_PER_MM
}

/// Creates [`PdfDocumentWriter`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfDocumentBackend;

impl DocumentBackend for PdfDocumentBackend {
    fn create(&self, setup: &PageSetup) -> Result<Box<dyn DocumentWriter>, ExportError> {
        Ok(Box::new(PdfDocumentWriter::new(*setup)))
    }
}

#[derive(Debug, Clone)]
struct ImagePlacement {
    png: Vec<u8>,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

/// Collects image placements per page and renders them into a PDF on export.
///
/// The document starts with one empty page, like a fresh sheet.
#[derive(Debug, Clone)]
pub struct PdfDocumentWriter {
    setup: PageSetup,
    pages: Vec<Vec<ImagePlacement>>,
}

impl PdfDocumentWriter {
    pub fn new(setup: PageSetup) -> Self {
        Self {
            setup,
            pages: vec![Vec::new()],
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

impl DocumentWriter for PdfDocumentWriter {
    fn page_size_mm(&self) -> (f64, f64) {
        (self.setup.page_width_mm, self.setup.page_height_mm)
    }

    fn new_page(&mut self) -> Result<(), ExportError> {
        self.pages.push(Vec::new());
        Ok(())
    }

    fn place_image(
        &mut self,
        buffer: &PixelBuffer,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<(), ExportError> {
        let page = self
            .pages
            .last_mut()
            .ok_or_else(|| ExportError::Assembly("document has no page".to_string()))?;
        page.push(ImagePlacement {
            png: buffer.png.clone(),
            x,
            y,
            width,
            height,
        });
        Ok(())
    }

    fn export_bytes(self: Box<Self>) -> Result<Vec<u8>, ExportError> {
        let (width, height) = self.page_size_mm();
        let surface = cairo::PdfSurface::for_stream(mm_to_pt(width), mm_to_pt(height), Vec::<u8>::new())
            .map_err(|e| ExportError::Assembly(format!("Cairo PDF error: {}", e)))?;

        {
            let ctx = cairo::Context::new(&surface)
                .map_err(|e| ExportError::Assembly(format!("Cairo context error: {}", e)))?;

            for (index, page) in self.pages.iter().enumerate() {
                if index > 0 {
                    ctx.show_page()
                        .map_err(|e| ExportError::Assembly(e.to_string()))?;
                }
                for placement in page {
                    draw_placement(&ctx, placement)?;
                }
            }
            ctx.show_page()
                .map_err(|e| ExportError::Assembly(e.to_string()))?;
        }

        let stream = surface
            .finish_output_stream()
            .map_err(|e| ExportError::Assembly(format!("PDF stream error: {}", e.error)))?;
        let bytes = stream
            .downcast::<Vec<u8>>()
            .map_err(|_| ExportError::Assembly("unexpected PDF stream type".to_string()))?;

        log::debug!(
            "Rendered PDF: {} page(s), {} bytes",
            self.pages.len(),
            bytes.len()
        );
        Ok(*bytes)
    }
}

fn draw_placement(ctx: &cairo::Context, placement: &ImagePlacement) -> Result<(), ExportError> {
    let image = cairo::ImageSurface::create_from_png(&mut Cursor::new(&placement.png))
        .map_err(|e| ExportError::Image(format!("Invalid page image: {}", e)))?;
    if image.width() == 0 || image.height() == 0 || placement.height <= 0.0 {
        return Ok(());
    }

    ctx.save()
        .map_err(|e| ExportError::Assembly(e.to_string()))?;
    ctx.translate(mm_to_pt(placement.x), mm_to_pt(placement.y));
    ctx.scale(
        mm_to_pt(placement.width) / image.width() as f64,
        mm_to_pt(placement.height) / image.height() as f64,
    );
    ctx.set_source_surface(&image, 0.0, 0.0)
        .map_err(|e| ExportError::Assembly(e.to_string()))?;
    ctx.paint()
        .map_err(|e| ExportError::Assembly(e.to_string()))?;
    ctx.restore()
        .map_err(|e| ExportError::Assembly(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millimetres_convert_to_points() {
        assert!((mm_to_pt(25.4) - 72.0).abs() < 1e-9);
        assert!((mm_to_pt(210.0) - 595.2756).abs() < 1e-3);
    }

    #[test]
    fn writer_starts_with_one_page() {
        let mut writer = PdfDocumentWriter::new(PageSetup::default());
        assert_eq!(writer.page_count(), 1);
        writer.new_page().unwrap();
        assert_eq!(writer.page_count(), 2);
        assert_eq!(writer.page_size_mm(), (210.0, 297.0));
    }

    #[test]
    fn invalid_png_fails_export() {
        let mut writer = PdfDocumentWriter::new(PageSetup::default());
        let buffer = PixelBuffer {
            width: 1,
            height: 1,
            png: vec![1, 2, 3],
        };
        writer.place_image(&buffer, 10.0, 10.0, 190.0, 50.0).unwrap();
        let err = Box::new(writer).export_bytes().unwrap_err();
        assert!(matches!(err, ExportError::Image(_)));
    }
}
