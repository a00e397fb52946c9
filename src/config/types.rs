//! Configuration type definitions.

use super::enums::ColorSpec;
use crate::export::slides::DEFAULT_WIDGET_MARKERS;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Paginated document geometry.
///
/// The printable area is the page minus `margin_mm` on every side; page images
/// are scaled to its width.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DocumentConfig {
    /// Page width in millimetres (A4 portrait: 210)
    #[serde(default = "default_page_width")]
    pub page_width_mm: f64,

    /// Page height in millimetres (A4 portrait: 297)
    #[serde(default = "default_page_height")]
    pub page_height_mm: f64,

    /// Margin applied to all four sides, in millimetres
    #[serde(default = "default_margin")]
    pub margin_mm: f64,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            page_width_mm: default_page_width(),
            page_height_mm: default_page_height(),
            margin_mm: default_margin(),
        }
    }
}

/// Slide deck geometry.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SlidesConfig {
    /// Slide width in inches (16:9 layout: 10)
    #[serde(default = "default_slide_width")]
    pub width_in: f64,

    /// Slide height in inches (16:9 layout: 5.625)
    #[serde(default = "default_slide_height")]
    pub height_in: f64,

    /// Fill behind each chart image, also the slide background
    #[serde(default)]
    pub background: ColorSpec,
}

impl Default for SlidesConfig {
    fn default() -> Self {
        Self {
            width_in: default_slide_width(),
            height_in: default_slide_height(),
            background: ColorSpec::default(),
        }
    }
}

/// Which part of the layout is captured, and at what resolution.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CaptureConfig {
    /// Raster oversampling factor (valid range: 1.0 - 4.0)
    #[serde(default = "default_oversampling")]
    pub oversampling: f64,

    /// Id of the dashboard root element
    #[serde(default = "default_root_id")]
    pub root_id: String,

    /// Class names that mark widget containers, one slide per match
    #[serde(default = "default_widget_markers")]
    pub widget_markers: Vec<String>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            oversampling: default_oversampling(),
            root_id: default_root_id(),
            widget_markers: default_widget_markers(),
        }
    }
}

/// Where finished exports are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct OutputConfig {
    /// Output directory; `~/` is expanded. Defaults to the download directory.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_page_width() -> f64 {
    210.0
}

fn default_page_height() -> f64 {
    297.0
}

fn default_margin() -> f64 {
    10.0
}

fn default_slide_width() -> f64 {
    10.0
}

fn default_slide_height() -> f64 {
    5.625
}

fn default_oversampling() -> f64 {
    2.0
}

fn default_root_id() -> String {
    "dashboard".to_string()
}

pub(crate) fn default_widget_markers() -> Vec<String> {
    DEFAULT_WIDGET_MARKERS
        .iter()
        .map(|marker| marker.to_string())
        .collect()
}
