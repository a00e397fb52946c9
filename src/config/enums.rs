//! Configuration enum types.

use crate::dom::{Color, color::WHITE};
use log::warn;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Color specification - either a CSS-style color string or RGB values.
///
/// # Examples
/// ```toml
/// # Hex or named color
/// background = "#FFFFFF"
///
/// # Custom RGB color (0-255 per component)
/// background = [245, 245, 245]
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
#[serde(untagged)]
pub enum ColorSpec {
    /// `#RGB`, `#RRGGBB`, `#RRGGBBAA` or a color name such as `white`
    Name(String),
    /// RGB color as [red, green, blue] where each component is 0-255
    Rgb([u8; 3]),
}

impl ColorSpec {
    /// Parses the specification, or `None` if a color string is not understood.
    pub fn parse(&self) -> Option<Color> {
        match self {
            ColorSpec::Name(name) => Color::parse(name),
            ColorSpec::Rgb([r, g, b]) => Some(Color::from_rgb8(*r, *g, *b)),
        }
    }

    /// Converts the color specification to a [`Color`].
    ///
    /// Unknown color strings fall back to white with a warning.
    pub fn to_color(&self) -> Color {
        self.parse().unwrap_or_else(|| {
            warn!("Unknown color '{:?}', using white", self);
            WHITE
        })
    }
}

impl Default for ColorSpec {
    fn default() -> Self {
        ColorSpec::Name("#FFFFFF".to_string())
    }
}
