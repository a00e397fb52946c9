//! Widget extraction and one-slide-per-widget layout.

use tokio_util::sync::CancellationToken;

use crate::dom::{Color, DashboardHost, Element, color::WHITE};
use crate::export::{
    dependencies::{RasterCapture, SlideDeckWriter},
    pipeline::offscreen_wrapper,
    types::{CaptureOptions, ExportError, WidgetBlock},
};

/// Widget container classes recognized in a dashboard.
pub const DEFAULT_WIDGET_MARKERS: [&str; 7] = [
    "dashboard-title-card",
    "barChar-container",
    "pie-chart-container",
    "histogram-container",
    "boxplot-container",
    "heatmap-container",
    "insides",
];

/// Slide geometry in inches plus the fill behind transparent charts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideSetup {
    pub width_in: f64,
    pub height_in: f64,
    pub background: Color,
}

impl SlideSetup {
    /// 16:9 layout, 10 × 5.625 inches.
    pub const WIDESCREEN: SlideSetup = SlideSetup {
        width_in: 10.0,
        height_in: 5.625,
        background: WHITE,
    };
}

impl Default for SlideSetup {
    fn default() -> Self {
        Self::WIDESCREEN
    }
}

/// Image rectangle on a slide, in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Aspect-ratio-preserving fit of a `widget_w × widget_h` image into a slide.
///
/// Wider-than-slide widgets fill the width and are centered vertically;
/// everything else fills the height and is centered horizontally.
pub fn fit_to_slide(widget_w: f64, widget_h: f64, slide_w: f64, slide_h: f64) -> Placement {
    let ratio = widget_w / widget_h;
    let slide_ratio = slide_w / slide_h;

    if ratio > slide_ratio {
        let h = (slide_w / ratio).min(slide_h);
        Placement {
            x: 0.0,
            y: ((slide_h - h) / 2.0).max(0.0),
            w: slide_w,
            h,
        }
    } else {
        let w = (slide_h * ratio).min(slide_w);
        Placement {
            x: ((slide_w - w) / 2.0).max(0.0),
            y: 0.0,
            w,
            h: slide_h,
        }
    }
}

/// Enumerates the widget containers under `root_id` in document order.
///
/// Every call walks the live tree again; the dashboard may have re-rendered
/// since the last export.
pub(crate) fn extract_widgets(
    host: &DashboardHost,
    root_id: &str,
    markers: &[String],
) -> Result<Vec<(WidgetBlock, Element)>, ExportError> {
    host.read(|dom| {
        let root = dom
            .get_element_by_id(root_id)
            .ok_or_else(|| ExportError::RootNotFound(root_id.to_string()))?;

        Ok(root
            .query_all(markers)
            .into_iter()
            .map(|element| {
                let (width, height) = element.box_size();
                let block = WidgetBlock {
                    selector_class: element.first_marker(markers).unwrap_or_default().to_string(),
                    bounding_width_px: width,
                    bounding_height_px: height,
                };
                (block, element.clone())
            })
            .collect())
    })
}

/// Wraps a widget clone in its own off-screen box sized to its bounding box,
/// so in-flow siblings cannot bleed into the capture.
pub(crate) fn isolate_widget(element: Element, block: &WidgetBlock) -> Element {
    offscreen_wrapper(element, block.bounding_width_px, block.bounding_height_px)
}

/// Captures each widget in isolation and appends one slide per widget.
///
/// Returns the number of slides added. Widgets without area are skipped.
pub(crate) async fn capture_slides(
    widgets: Vec<(WidgetBlock, Element)>,
    deck: &mut dyn SlideDeckWriter,
    capture: &dyn RasterCapture,
    setup: &SlideSetup,
    oversampling: f64,
    cancel: &CancellationToken,
) -> Result<usize, ExportError> {
    let (slide_w, slide_h) = deck.slide_size_in();
    let total = widgets.len();
    let mut added = 0;

    for (index, (block, element)) in widgets.into_iter().enumerate() {
        if cancel.is_cancelled() {
            log::info!("Slide capture cancelled before widget {}/{}", index + 1, total);
            return Err(ExportError::Cancelled);
        }
        if !block.has_area() {
            log::warn!(
                "Skipping widget {} (.{}): zero-sized bounding box",
                index + 1,
                block.selector_class
            );
            continue;
        }

        let wrapper = isolate_widget(element, &block);
        let options = CaptureOptions {
            scale: oversampling,
            width: block.bounding_width_px,
            height: block.bounding_height_px,
            background: Some(setup.background),
        };
        let buffer = capture.capture(&wrapper, &options).await?;
        drop(wrapper);

        let placement = fit_to_slide(
            block.bounding_width_px,
            block.bounding_height_px,
            slide_w,
            slide_h,
        );
        log::debug!(
            "Widget {}/{} (.{}) -> slide {} at {:?}",
            index + 1,
            total,
            block.selector_class,
            added + 1,
            placement
        );
        deck.add_slide().place_image(&buffer, placement)?;
        added += 1;
    }

    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SW: f64 = 10.0;
    const SH: f64 = 5.625;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn wide_widget_fits_width_and_centers_vertically() {
        let p = fit_to_slide(800.0, 400.0, SW, SH);
        assert!(approx(p.w, 10.0));
        assert!(approx(p.h, 5.0));
        assert!(approx(p.x, 0.0));
        assert!(approx(p.y, 0.3125));
    }

    #[test]
    fn tall_widget_fits_height_and_centers_horizontally() {
        let p = fit_to_slide(400.0, 800.0, SW, SH);
        assert!(approx(p.h, SH));
        assert!(approx(p.w, 2.8125));
        assert!(approx(p.y, 0.0));
        assert!(approx(p.x, (SW - 2.8125) / 2.0));
    }

    #[test]
    fn placement_always_stays_inside_and_is_tight_on_one_axis() {
        let sizes = [
            (1.0, 1.0),
            (1920.0, 1080.0),
            (1600.0, 900.0),
            (333.0, 1000.0),
            (5000.0, 3.0),
            (3.0, 5000.0),
            (1000.0, 562.5),
            (999.9, 562.5),
        ];
        for (w, h) in sizes {
            let p = fit_to_slide(w, h, SW, SH);
            assert!(p.x >= 0.0 && p.y >= 0.0, "{w}x{h}: {p:?}");
            assert!(p.x + p.w <= SW + 1e-9, "{w}x{h}: {p:?}");
            assert!(p.y + p.h <= SH + 1e-9, "{w}x{h}: {p:?}");
            assert!(approx(p.w, SW) || approx(p.h, SH), "{w}x{h}: {p:?}");
            assert!(((p.w / p.h) - (w / h)).abs() / (w / h) < 1e-9, "{w}x{h}");
        }
    }

    #[test]
    fn extraction_reports_marker_and_box_in_dom_order() {
        use crate::dom::Dom;

        let dashboard = Element::default()
            .with_id("dashboard")
            .with_child(
                Element::sized(1000.0, 120.0)
                    .with_class("card")
                    .with_class("dashboard-title-card"),
            )
            .with_child(
                Element::sized(1000.0, 400.0)
                    .at(0.0, 140.0)
                    .with_child(Element::sized(480.0, 360.0).with_class("pie-chart-container")),
            );
        let host = DashboardHost::new(Dom::new(Element::default().with_child(dashboard)));
        let markers: Vec<String> = DEFAULT_WIDGET_MARKERS.iter().map(|m| m.to_string()).collect();

        let widgets = extract_widgets(&host, "dashboard", &markers).unwrap();
        let blocks: Vec<_> = widgets.iter().map(|(block, _)| block.clone()).collect();
        assert_eq!(
            blocks,
            vec![
                WidgetBlock {
                    selector_class: "dashboard-title-card".into(),
                    bounding_width_px: 1000.0,
                    bounding_height_px: 120.0,
                },
                WidgetBlock {
                    selector_class: "pie-chart-container".into(),
                    bounding_width_px: 480.0,
                    bounding_height_px: 360.0,
                },
            ]
        );

        assert!(matches!(
            extract_widgets(&host, "nope", &markers),
            Err(ExportError::RootNotFound(_))
        ));
    }

    #[test]
    fn isolated_widget_is_pinned_inside_an_exact_box() {
        let block = WidgetBlock {
            selector_class: "insides".into(),
            bounding_width_px: 300.0,
            bounding_height_px: 200.0,
        };
        let wrapper = isolate_widget(Element::sized(300.0, 200.0).at(40.0, 900.0), &block);
        assert_eq!((wrapper.width, wrapper.height), (300.0, 200.0));
        assert!(wrapper.clips_overflow());
        assert_eq!(wrapper.children[0].offset(), (0.0, 0.0));
    }
}
