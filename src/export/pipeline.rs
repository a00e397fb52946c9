use tokio_util::sync::CancellationToken;

use crate::dom::{Element, format_px};
use crate::export::{
    dependencies::RasterCapture,
    planner::PaginationPlan,
    types::{CaptureOptions, CaptureTarget, ExportError, PixelBuffer},
};

/// Left offset that keeps staging wrappers off the visible page.
pub(crate) const OFFSCREEN_LEFT: &str = "-9999px";

/// Builds an off-screen, overflow-clipping wrapper of the given size holding
/// `clone` pinned to its top-left corner.
pub(crate) fn offscreen_wrapper(mut clone: Element, width: f64, height: f64) -> Element {
    clone.set_style("position", "absolute");
    clone.set_style("top", "0");
    clone.set_style("left", "0");

    let mut wrapper = Element::sized(width, height);
    wrapper.set_style("position", "absolute");
    wrapper.set_style("left", OFFSCREEN_LEFT);
    wrapper.set_style("overflow", "hidden");
    wrapper.children.push(clone);
    wrapper
}

/// Off-screen wrapper holding the single dashboard clone reused for every page.
///
/// Mounted once before the page loop and dropped once after it.
pub(crate) struct PageStage {
    wrapper: Element,
}

impl PageStage {
    pub(crate) fn mount(target: &CaptureTarget, viewport_height: f64) -> Self {
        Self {
            wrapper: offscreen_wrapper(
                target.element.clone(),
                target.measured_width,
                viewport_height,
            ),
        }
    }

    /// Scrolls the clone so `offset` pixels of the container sit above the wrapper.
    pub(crate) fn shift_to(&mut self, offset: f64) {
        if let Some(clone) = self.wrapper.children.first_mut() {
            clone.set_style("top", format_px(-offset));
        }
    }

    pub(crate) fn wrapper(&self) -> &Element {
        &self.wrapper
    }
}

/// Captures every page region of `plan`, strictly in index order.
///
/// `cancel` is checked before each capture; a cancelled run and a failed
/// capture both discard the pages captured so far.
pub(crate) async fn capture_pages(
    target: &CaptureTarget,
    plan: &PaginationPlan,
    capture: &dyn RasterCapture,
    oversampling: f64,
    cancel: &CancellationToken,
) -> Result<Vec<PixelBuffer>, ExportError> {
    let mut stage = PageStage::mount(target, plan.viewport_height);
    let mut pages = Vec::with_capacity(plan.pages_needed());

    for region in &plan.regions {
        if cancel.is_cancelled() {
            log::info!(
                "Document capture cancelled before page {}/{}",
                region.index + 1,
                plan.pages_needed()
            );
            return Err(ExportError::Cancelled);
        }

        stage.shift_to(region.vertical_offset_px);
        let options = CaptureOptions {
            scale: oversampling,
            width: target.measured_width,
            height: region.viewport_height_px,
            background: None,
        };

        let buffer = capture.capture(stage.wrapper(), &options).await?;
        log::debug!(
            "Captured page {}/{} at offset {:.1}px ({}x{} px)",
            region.index + 1,
            plan.pages_needed(),
            region.vertical_offset_px,
            buffer.width,
            buffer.height
        );
        pages.push(buffer);
    }

    Ok(pages)
}
