//! In-process element tree standing in for the live dashboard DOM.
//!
//! The export engine only needs three things from the dashboard: measurable
//! boxes, a way to find widget containers in document order, and inline style
//! properties it can mutate and restore. [`Element`] models exactly that, and
//! [`DashboardHost`] shares one tree between the caller and the export jobs.

pub mod color;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use color::Color;

/// Inline style properties, keyed by CSS property name.
pub type StyleMap = BTreeMap<String, String>;

/// One node of the dashboard tree.
///
/// `x`/`y` place the box relative to its parent. `position: absolute` with
/// `top`/`left` entries in [`Element::style`] overrides them, which is how the
/// capture pipeline shifts clones around.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Element {
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub style: StyleMap,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Background fill, any string [`Color::parse`] accepts.
    pub background: Option<String>,
    pub text: Option<String>,
    pub font_size: Option<f64>,
    /// Text color, defaults to black.
    pub color: Option<String>,
    /// PNG drawn stretched over the element box.
    pub image: Option<PathBuf>,
    pub children: Vec<Element>,
}

impl Element {
    /// Creates an empty element with the given box size.
    pub fn sized(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn style_value(&self, property: &str) -> Option<&str> {
        self.style.get(property).map(String::as_str)
    }

    pub fn set_style(&mut self, property: &str, value: impl Into<String>) {
        self.style.insert(property.to_string(), value.into());
    }

    pub fn remove_style(&mut self, property: &str) -> Option<String> {
        self.style.remove(property)
    }

    /// Offset of this box inside its parent, honoring absolute positioning.
    pub fn offset(&self) -> (f64, f64) {
        if self.style_value("position") != Some("absolute") {
            return (self.x, self.y);
        }
        let left = self.style_value("left").and_then(parse_px).unwrap_or(self.x);
        let top = self.style_value("top").and_then(parse_px).unwrap_or(self.y);
        (left, top)
    }

    /// Whether descendants are clipped to this element's box.
    pub fn clips_overflow(&self) -> bool {
        self.style_value("overflow") == Some("hidden")
    }

    /// Full scrollable width: the box or the farthest child edge, whichever is larger.
    pub fn scroll_width(&self) -> f64 {
        self.children
            .iter()
            .map(|child| child.offset().0 + child.scroll_width())
            .fold(self.width, f64::max)
    }

    /// Full scrollable height: the box or the lowest child edge, whichever is larger.
    pub fn scroll_height(&self) -> f64 {
        self.children
            .iter()
            .map(|child| child.offset().1 + child.scroll_height())
            .fold(self.height, f64::max)
    }

    /// Rendered box size; elements without an explicit box size report their content extent.
    pub fn box_size(&self) -> (f64, f64) {
        let width = if self.width > 0.0 {
            self.width
        } else {
            self.scroll_width()
        };
        let height = if self.height > 0.0 {
            self.height
        } else {
            self.scroll_height()
        };
        (width, height)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find_by_id(id))
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.find_by_id_mut(id))
    }

    /// Returns every descendant carrying any of `markers`, in document order.
    ///
    /// Matches nested inside another match are returned too, after their
    /// ancestor.
    pub fn query_all<'a>(&'a self, markers: &[String]) -> Vec<&'a Element> {
        let mut found = Vec::new();
        for child in &self.children {
            child.collect_matches(markers, &mut found);
        }
        found
    }

    fn collect_matches<'a>(&'a self, markers: &[String], found: &mut Vec<&'a Element>) {
        if self.first_marker(markers).is_some() {
            found.push(self);
        }
        for child in &self.children {
            child.collect_matches(markers, found);
        }
    }

    /// The first class of this element that appears in `markers`.
    pub fn first_marker<'a>(&'a self, markers: &[String]) -> Option<&'a str> {
        self.classes
            .iter()
            .find(|class| markers.contains(class))
            .map(String::as_str)
    }
}

/// Parses a CSS pixel length such as `0`, `12.5px` or `-300px`.
pub fn parse_px(value: &str) -> Option<f64> {
    let value = value.trim();
    value
        .strip_suffix("px")
        .unwrap_or(value)
        .trim()
        .parse::<f64>()
        .ok()
}

/// Formats a pixel length the way inline styles carry it.
pub fn format_px(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        format!("{value}px")
    }
}

/// Errors raised while loading a dashboard layout file.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("Failed to read layout {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid layout {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// The whole document: a body element holding the dashboard.
///
/// # Example TOML
/// ```toml
/// [body]
/// width = 1000.0
///
/// [[body.children]]
/// id = "dashboard"
/// width = 1000.0
///
/// [[body.children.children]]
/// classes = ["dashboard-title-card"]
/// width = 1000.0
/// height = 120.0
/// text = "Quarterly report"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dom {
    #[serde(default)]
    pub body: Element,
}

impl Dom {
    pub fn new(body: Element) -> Self {
        Self { body }
    }

    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<&Element> {
        self.body.find_by_id(id)
    }

    pub fn element_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.body.find_by_id_mut(id)
    }
}

/// Shared handle onto the live dashboard tree.
///
/// Cloning the handle shares the tree. Export jobs read it, and the document
/// export mutates the root's inline styles for the duration of a job.
#[derive(Debug, Clone, Default)]
pub struct DashboardHost {
    dom: Arc<RwLock<Dom>>,
}

impl DashboardHost {
    pub fn new(dom: Dom) -> Self {
        Self {
            dom: Arc::new(RwLock::new(dom)),
        }
    }

    /// Loads a dashboard from a TOML layout file.
    pub fn from_layout_file(path: &Path) -> Result<Self, LayoutError> {
        let source = fs::read_to_string(path).map_err(|source| LayoutError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let dom = Dom::from_toml_str(&source).map_err(|source| LayoutError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded dashboard layout from {}", path.display());
        Ok(Self::new(dom))
    }

    pub fn read<R>(&self, f: impl FnOnce(&Dom) -> R) -> R {
        let dom = self.dom.read().unwrap_or_else(PoisonError::into_inner);
        f(&dom)
    }

    pub fn write<R>(&self, f: impl FnOnce(&mut Dom) -> R) -> R {
        let mut dom = self.dom.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut dom)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.read(|dom| dom.get_element_by_id(id).is_some())
    }

    /// Deep copy of the element with `id`, if present.
    pub fn clone_element(&self, id: &str) -> Option<Element> {
        self.read(|dom| dom.get_element_by_id(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers() -> Vec<String> {
        vec!["chart".to_string(), "title".to_string()]
    }

    #[test]
    fn scroll_height_covers_lowest_child() {
        let root = Element::sized(1000.0, 200.0)
            .with_child(Element::sized(1000.0, 300.0).at(0.0, 100.0))
            .with_child(Element::sized(400.0, 500.0).at(0.0, 2100.0));
        assert_eq!(root.scroll_height(), 2600.0);
        assert_eq!(root.scroll_width(), 1000.0);
    }

    #[test]
    fn absolute_position_overrides_flow_offset() {
        let mut element = Element::sized(10.0, 10.0).at(5.0, 7.0);
        element.set_style("top", "-300px");
        assert_eq!(element.offset(), (5.0, 7.0));
        element.set_style("position", "absolute");
        assert_eq!(element.offset(), (5.0, -300.0));
    }

    #[test]
    fn query_all_returns_nested_matches_in_document_order() {
        let root = Element::default()
            .with_child(
                Element::default()
                    .with_class("title")
                    .with_id("a")
                    .with_child(Element::default().with_class("chart").with_id("nested")),
            )
            .with_child(
                Element::default()
                    .with_child(Element::default().with_class("chart").with_id("b")),
            )
            .with_child(Element::default().with_class("other"))
            .with_child(Element::default().with_class("chart").with_id("c"));

        let ids: Vec<_> = root
            .query_all(&markers())
            .iter()
            .filter_map(|el| el.id.as_deref())
            .collect();
        assert_eq!(ids, vec!["a", "nested", "b", "c"]);
    }

    #[test]
    fn parse_and_format_px() {
        assert_eq!(parse_px("0"), Some(0.0));
        assert_eq!(parse_px("-12.5px"), Some(-12.5));
        assert_eq!(parse_px("auto"), None);
        assert_eq!(format_px(0.0), "0");
        assert_eq!(format_px(-1047.5), "-1047.5px");
    }

    #[test]
    fn layout_toml_round_trips_into_tree() {
        let dom = Dom::from_toml_str(
            r##"
            [body]
            width = 1000.0

            [[body.children]]
            id = "dashboard"
            width = 1000.0

            [[body.children.children]]
            classes = ["title"]
            height = 120.0
            text = "Report"
            background = "#FFFFFF"
            "##,
        )
        .unwrap();
        let dashboard = dom.get_element_by_id("dashboard").unwrap();
        assert_eq!(dashboard.children.len(), 1);
        assert_eq!(dashboard.scroll_height(), 120.0);
        assert_eq!(dashboard.children[0].text.as_deref(), Some("Report"));
    }

    #[test]
    fn host_handles_share_one_tree() {
        let host = DashboardHost::new(Dom::new(
            Element::default().with_child(Element::sized(1.0, 1.0).with_id("dashboard")),
        ));
        let other = host.clone();
        other.write(|dom| {
            dom.element_by_id_mut("dashboard")
                .unwrap()
                .set_style("top", "0")
        });
        assert!(host.contains("dashboard"));
        assert_eq!(
            host.clone_element("dashboard")
                .unwrap()
                .style_value("top"),
            Some("0")
        );
    }
}
