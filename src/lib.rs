//! Dashboard export: paginated PDF reports, one-slide-per-widget decks and
//! single-widget PNG images from a dashboard layout.
//!
//! The [`export::ExportController`] drives every job against a
//! [`dom::DashboardHost`]; the [`render`] module supplies the cairo rasterizer
//! and the PDF/PPTX writers it uses by default.

pub mod config;
pub mod dom;
pub mod export;
pub mod notification;
pub mod render;

pub use config::Config;
pub use dom::{DashboardHost, Dom, Element};
pub use export::{ExportController, ExportError, ExportOutcome, ExportSettings};
