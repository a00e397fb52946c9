//! RGBA color type and parsing of CSS-style color strings.

/// Represents an RGBA color with floating-point components.
///
/// All components are in the range 0.0 (minimum) to 1.0 (maximum).
///
/// # Examples
///
/// ```
/// use dashexport::dom::Color;
/// let white = Color::parse("#FFFFFF").unwrap();
/// assert_eq!(white, dashexport::dom::color::WHITE);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    /// Creates a new color from RGBA components.
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color from 8-bit channels.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
            a: 1.0,
        }
    }

    /// Parses `#RGB`, `#RRGGBB`, `#RRGGBBAA` or a known color name.
    ///
    /// Returns `None` for anything else.
    pub fn parse(spec: &str) -> Option<Self> {
        let spec = spec.trim();
        match spec.strip_prefix('#') {
            Some(hex) => parse_hex(hex),
            None => name_to_color(spec),
        }
    }

    /// Whether painting this color would change any pixel.
    pub fn is_visible(&self) -> bool {
        self.a > 0.0
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut parts = hex.chars().map(|c| channel(&format!("{c}{c}")));
            Some(Color::from_rgb8(parts.next()??, parts.next()??, parts.next()??))
        }
        6 | 8 => {
            let mut color = Color::from_rgb8(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            );
            if hex.len() == 8 {
                color.a = channel(&hex[6..8])? as f64 / 255.0;
            }
            Some(color)
        }
        _ => None,
    }
}

/// Maps a color name (case-insensitive) to a predefined color.
pub fn name_to_color(name: &str) -> Option<Color> {
    match name.to_lowercase().as_str() {
        "white" => Some(WHITE),
        "black" => Some(BLACK),
        "transparent" => Some(TRANSPARENT),
        "red" => Some(Color::new(1.0, 0.0, 0.0, 1.0)),
        "green" => Some(Color::new(0.0, 0.5, 0.0, 1.0)),
        "blue" => Some(Color::new(0.0, 0.0, 1.0, 1.0)),
        "gray" | "grey" => Some(Color::new(0.5, 0.5, 0.5, 1.0)),
        _ => None,
    }
}

pub const WHITE: Color = Color {
    r: 1.0,
    g: 1.0,
    b: 1.0,
    a: 1.0,
};

pub const BLACK: Color = Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

pub const TRANSPARENT: Color = Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 0.0,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!(Color::parse("#ffffff"), Some(WHITE));
        assert_eq!(Color::parse("#000"), Some(BLACK));
        let half = Color::parse("#FF000080").unwrap();
        assert_eq!(half.r, 1.0);
        assert!((half.a - 128.0 / 255.0).abs() < 1e-9);
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!(Color::parse("White"), Some(WHITE));
        assert_eq!(Color::parse("transparent"), Some(TRANSPARENT));
        assert!(!TRANSPARENT.is_visible());
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(Color::parse("#12"), None);
        assert_eq!(Color::parse("#zzzzzz"), None);
        assert_eq!(Color::parse("chartreuse-ish"), None);
    }
}
