//! Dashboard export engine.
//!
//! This module turns the live dashboard into two artifacts:
//! - a paginated document, one page image per vertical slice of the dashboard
//! - a slide deck, one slide per widget container
//!
//! plus single-widget PNG downloads. Capture, writers, delivery, overlay and
//! alerts are reached through the traits in [`dependencies`], so every stage
//! can be exercised without a renderer.

pub mod dependencies;
pub mod file;
pub mod planner;
pub mod slides;
pub mod style_guard;
pub mod types;

mod assembler;
mod controller;
mod pipeline;

pub use controller::{
    DOCUMENT_BUSY_MESSAGE, DOCUMENT_FAILURE_MESSAGE, DocumentStage, ExportController,
    ExportSettings, NO_WIDGETS_MESSAGE, SLIDE_DECK_BUSY_MESSAGE, SLIDE_DECK_FAILURE_MESSAGE,
};
pub use dependencies::ExportDependencies;
pub use planner::{PageSetup, PaginationPlan, plan_pages};
pub use slides::{Placement, SlideSetup, fit_to_slide};
pub use types::{
    CaptureOptions, ExportError, ExportJob, ExportKind, ExportOutcome, ExportState, PageRegion,
    PixelBuffer, WidgetBlock,
};
