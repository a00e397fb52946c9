//! Configuration file support for dashexport.
//!
//! Settings are loaded from `~/.config/dashexport/config.toml`. They cover the
//! document page geometry, the slide layout, what gets captured and where the
//! results are written. If no config file exists, defaults are used.

pub mod enums;
pub mod types;

pub use enums::ColorSpec;
pub use types::{CaptureConfig, DocumentConfig, OutputConfig, SlidesConfig};

use crate::export::{ExportSettings, PageSetup, SlideSetup, file};
use anyhow::{Context, Result};
use log::{debug, info};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Smallest page or slide edge accepted, in the section's own unit.
const MIN_PAGE_EDGE: f64 = 1.0;

/// Main configuration structure containing all user settings.
///
/// # Example TOML
/// ```toml
/// [document]
/// page_width_mm = 210
/// page_height_mm = 297
/// margin_mm = 10
///
/// [slides]
/// width_in = 10.0
/// height_in = 5.625
/// background = "#FFFFFF"
///
/// [capture]
/// oversampling = 2.0
/// root_id = "dashboard"
///
/// [output]
/// directory = "~/Reports"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, JsonSchema)]
pub struct Config {
    /// Paginated document geometry
    #[serde(default)]
    pub document: DocumentConfig,

    /// Slide deck geometry and background
    #[serde(default)]
    pub slides: SlidesConfig,

    /// Capture root, widget markers and resolution
    #[serde(default)]
    pub capture: CaptureConfig,

    /// Output location
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Invalid values are clamped to the nearest valid value and a warning is
    /// logged.
    ///
    /// Validated ranges:
    /// - `oversampling`: 1.0 - 4.0
    /// - page and slide edges: at least 1.0
    /// - `margin_mm`: 0.0 up to just under half the shorter page edge
    pub fn validate_and_clamp(&mut self) {
        // Oversampling: 1.0 - 4.0
        if !(1.0..=4.0).contains(&self.capture.oversampling) {
            log::warn!(
                "Invalid oversampling {:.2}, clamping to 1.0-4.0 range",
                self.capture.oversampling
            );
            self.capture.oversampling = if self.capture.oversampling.is_nan() {
                1.0
            } else {
                self.capture.oversampling.clamp(1.0, 4.0)
            };
        }

        clamp_edge("document.page_width_mm", &mut self.document.page_width_mm);
        clamp_edge("document.page_height_mm", &mut self.document.page_height_mm);
        clamp_edge("slides.width_in", &mut self.slides.width_in);
        clamp_edge("slides.height_in", &mut self.slides.height_in);

        // Margins must leave a printable area
        let shorter = self
            .document
            .page_width_mm
            .min(self.document.page_height_mm);
        let max_margin = (shorter / 2.0 - MIN_PAGE_EDGE / 2.0).max(0.0);
        if !(0.0..=max_margin).contains(&self.document.margin_mm) {
            log::warn!(
                "Invalid margin_mm {:.1}, clamping to 0.0-{:.1} range",
                self.document.margin_mm,
                max_margin
            );
            self.document.margin_mm = if self.document.margin_mm.is_nan() {
                0.0
            } else {
                self.document.margin_mm.clamp(0.0, max_margin)
            };
        }

        if self.slides.background.parse().is_none() {
            log::warn!(
                "Invalid slide background {:?}, falling back to white",
                self.slides.background
            );
            self.slides.background = ColorSpec::default();
        }

        if self.capture.root_id.trim().is_empty() {
            log::warn!("Empty capture root_id, falling back to 'dashboard'");
            self.capture.root_id = "dashboard".to_string();
        }

        self.capture
            .widget_markers
            .retain(|marker| !marker.trim().is_empty());
        if self.capture.widget_markers.is_empty() {
            log::warn!("No widget markers configured, using the built-in list");
            self.capture.widget_markers = types::default_widget_markers();
        }
    }

    /// Returns the path to the configuration file.
    ///
    /// The config file is located at `~/.config/dashexport/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("dashexport");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from the default location, or returns defaults if not found.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Loads configuration from `config_path`, or returns defaults if the file
    /// does not exist. All loaded values are validated and clamped.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file exists but cannot be read
    /// - The file exists but contains invalid TOML syntax
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

        config.validate_and_clamp();

        info!("Loaded config from {}", config_path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Serializes the configuration as pretty TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// JSON schema of the configuration file.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }

    /// Settings for the export controller.
    pub fn export_settings(&self) -> ExportSettings {
        ExportSettings {
            root_id: self.capture.root_id.clone(),
            widget_markers: self.capture.widget_markers.clone(),
            oversampling: self.capture.oversampling,
            page: PageSetup {
                page_width_mm: self.document.page_width_mm,
                page_height_mm: self.document.page_height_mm,
                margin_mm: self.document.margin_mm,
            },
            slides: SlideSetup {
                width_in: self.slides.width_in,
                height_in: self.slides.height_in,
                background: self.slides.background.to_color(),
            },
        }
    }

    /// Directory exports are written to, with `~/` expanded.
    pub fn output_directory(&self) -> PathBuf {
        match &self.output.directory {
            Some(dir) => file::expand_tilde(&dir.to_string_lossy()),
            None => file::default_download_dir(),
        }
    }
}

fn clamp_edge(name: &str, value: &mut f64) {
    let current = *value;
    if !current.is_finite() || current < MIN_PAGE_EDGE {
        log::warn!(
            "Invalid {} {:.3}, clamping to minimum {:.1}",
            name,
            current,
            MIN_PAGE_EDGE
        );
        *value = if current.is_finite() {
            current.max(MIN_PAGE_EDGE)
        } else {
            MIN_PAGE_EDGE
        };
    }
}
