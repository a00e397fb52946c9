//! Pagination of a tall container onto fixed-size document pages.

use crate::export::types::{ExportError, PageRegion};

/// Tolerance applied before rounding the page count up, so a container that
/// fills its last page exactly does not spill into an empty one.
const PAGE_COUNT_EPSILON: f64 = 1e-9;

/// Physical page geometry in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSetup {
    pub page_width_mm: f64,
    pub page_height_mm: f64,
    /// Uniform margin on all four sides.
    pub margin_mm: f64,
}

impl PageSetup {
    /// A4 portrait with 10 mm margins.
    pub const A4_PORTRAIT: PageSetup = PageSetup {
        page_width_mm: 210.0,
        page_height_mm: 297.0,
        margin_mm: 10.0,
    };

    pub fn content_width_mm(&self) -> f64 {
        self.page_width_mm - 2.0 * self.margin_mm
    }

    pub fn content_height_mm(&self) -> f64 {
        self.page_height_mm - 2.0 * self.margin_mm
    }
}

impl Default for PageSetup {
    fn default() -> Self {
        Self::A4_PORTRAIT
    }
}

/// How a container of `container_width × full_height` pixels maps onto pages.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationPlan {
    /// Page units per container pixel.
    pub scale: f64,
    pub container_width: f64,
    pub full_height: f64,
    pub scaled_full_height: f64,
    /// Printable height of one page, in page units.
    pub page_height: f64,
    /// Container pixels covered by one full page.
    pub viewport_height: f64,
    pub regions: Vec<PageRegion>,
}

impl PaginationPlan {
    pub fn pages_needed(&self) -> usize {
        self.regions.len()
    }

    /// Height the image of page `index` occupies on its page: a full page
    /// except for the last one, which only covers the remaining content.
    pub fn rendered_height(&self, index: usize) -> f64 {
        let remaining = self.scaled_full_height - index as f64 * self.page_height;
        self.page_height.min(remaining).max(0.0)
    }
}

/// Splits a container into page regions.
///
/// `page_width`/`page_height` are the printable budget after margins, in any
/// unit; the plan's scaled values use the same unit. The result always has at
/// least one region and never an empty trailing one.
pub fn plan_pages(
    container_width: f64,
    full_height: f64,
    page_width: f64,
    page_height: f64,
) -> Result<PaginationPlan, ExportError> {
    if !(container_width > 0.0 && full_height >= 0.0 && full_height.is_finite()) {
        return Err(ExportError::EmptyContainer {
            width: container_width,
            height: full_height,
        });
    }
    if !(page_width > 0.0 && page_height > 0.0) {
        return Err(ExportError::Assembly(format!(
            "page budget must be positive, got {page_width}x{page_height}"
        )));
    }

    let scale = page_width / container_width;
    let scaled_full_height = full_height * scale;
    let viewport_height = page_height / scale;
    let pages_needed = ((scaled_full_height / page_height) - PAGE_COUNT_EPSILON)
        .ceil()
        .max(1.0) as usize;

    let regions = (0..pages_needed)
        .map(|index| {
            let vertical_offset_px = index as f64 * viewport_height;
            let remaining = full_height - vertical_offset_px;
            PageRegion {
                index,
                vertical_offset_px,
                viewport_height_px: if index + 1 == pages_needed && remaining > 0.0 {
                    viewport_height.min(remaining)
                } else {
                    viewport_height
                },
            }
        })
        .collect();

    log::debug!(
        "Pagination: {}x{} px at scale {:.4} -> {} page(s), viewport {:.1} px",
        container_width,
        full_height,
        scale,
        pages_needed,
        viewport_height
    );

    Ok(PaginationPlan {
        scale,
        container_width,
        full_height,
        scaled_full_height,
        page_height,
        viewport_height,
        regions,
    })
}
