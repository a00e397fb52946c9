//! Placement of captured pages into a paginated document.

use tokio::task;

use crate::export::{
    dependencies::DocumentWriter,
    planner::{PageSetup, PaginationPlan},
    types::{ExportError, PixelBuffer},
};

/// Places each page image full-width inside the margins.
///
/// The writer starts with one page, so a new page is only opened for
/// `index > 0`. The last image is only as tall as the content left on it.
pub(crate) fn assemble_pages(
    writer: &mut dyn DocumentWriter,
    plan: &PaginationPlan,
    setup: &PageSetup,
    pages: &[PixelBuffer],
) -> Result<(), ExportError> {
    if pages.len() != plan.pages_needed() {
        return Err(ExportError::Assembly(format!(
            "expected {} captured pages, got {}",
            plan.pages_needed(),
            pages.len()
        )));
    }

    for (index, buffer) in pages.iter().enumerate() {
        if index > 0 {
            writer.new_page()?;
        }
        writer.place_image(
            buffer,
            setup.margin_mm,
            setup.margin_mm,
            setup.content_width_mm(),
            plan.rendered_height(index),
        )?;
    }

    log::debug!("Placed {} page image(s)", pages.len());
    Ok(())
}

/// Finalizes the document off the async executor.
pub(crate) async fn finalize_document(
    writer: Box<dyn DocumentWriter>,
) -> Result<Vec<u8>, ExportError> {
    task::spawn_blocking(move || writer.export_bytes())
        .await
        .map_err(|e| ExportError::Task(format!("Document finalize task failed: {}", e)))?
}
