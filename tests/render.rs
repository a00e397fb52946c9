use std::io::Cursor;

use dashexport::dom::{Element, color::WHITE};
use dashexport::export::{
    CaptureOptions, PageSetup, PixelBuffer, SlideSetup,
    dependencies::{
        DocumentBackend, DocumentWriter, RasterCapture, Slide, SlideDeckBackend, SlideDeckWriter,
    },
    fit_to_slide,
};
use dashexport::render::{CairoRasterizer, PdfDocumentBackend, PptxDeckBackend, render_png};

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

fn chart(width: f64, height: f64) -> Element {
    let mut chart = Element::sized(width, height).with_class("barChar-container");
    chart.background = Some("#336699".to_string());
    chart.text = Some("Revenue".to_string());
    chart.color = Some("white".to_string());
    chart
}

fn options(width: f64, height: f64, scale: f64) -> CaptureOptions {
    CaptureOptions {
        scale,
        width,
        height,
        background: Some(WHITE),
    }
}

fn pixel_at(png: &[u8], x: i32, y: i32) -> [u8; 4] {
    let mut surface = cairo::ImageSurface::create_from_png(&mut Cursor::new(png)).unwrap();
    let stride = surface.stride();
    let data = surface.data().unwrap();
    let offset = (y * stride + x * 4) as usize;
    [
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ]
}

#[tokio::test]
async fn rasterizer_paints_element_backgrounds() {
    let buffer = CairoRasterizer
        .capture(&chart(200.0, 100.0), &options(200.0, 100.0, 2.0))
        .await
        .unwrap();

    assert_eq!((buffer.width, buffer.height), (400, 200));
    assert_eq!(&buffer.png[0..8], &PNG_SIGNATURE);
    // ARGB32 is stored as BGRA on little-endian hosts; #336699 is opaque.
    let pixel = pixel_at(&buffer.png, 395, 195);
    assert_eq!(pixel[3], 255);
    assert_eq!(pixel[0], 0x99);
}

#[test]
fn clipped_wrapper_hides_content_outside_the_viewport() {
    let mut clone = chart(200.0, 400.0);
    clone.set_style("position", "absolute");
    clone.set_style("top", "-300px");
    let mut wrapper = Element::sized(200.0, 100.0).with_child(clone);
    wrapper.set_style("overflow", "hidden");

    let buffer = render_png(&wrapper, &options(200.0, 100.0, 1.0)).unwrap();
    assert_eq!((buffer.width, buffer.height), (200, 100));
    let pixel = pixel_at(&buffer.png, 100, 50);
    assert_eq!(pixel[0], 0x99);
}

#[test]
fn pdf_writer_produces_a_multi_page_document() {
    let page = render_png(&chart(190.0, 277.0), &options(190.0, 277.0, 1.0)).unwrap();

    let mut writer = PdfDocumentBackend.create(&PageSetup::default()).unwrap();
    writer.place_image(&page, 10.0, 10.0, 190.0, 277.0).unwrap();
    writer.new_page().unwrap();
    writer.place_image(&page, 10.0, 10.0, 190.0, 120.0).unwrap();
    let bytes = writer.export_bytes().unwrap();

    assert!(bytes.starts_with(b"%PDF-"));
    assert!(String::from_utf8_lossy(&bytes).trim_end().ends_with("%%EOF"));
}

#[test]
fn pptx_writer_packages_one_slide_per_image() {
    let setup = SlideSetup::default();
    let mut deck = PptxDeckBackend.create(&setup).unwrap();
    for (w, h) in [(800.0, 400.0), (400.0, 800.0)] {
        let buffer: PixelBuffer = render_png(&chart(w, h), &options(w, h, 1.0)).unwrap();
        deck.add_slide()
            .place_image(&buffer, fit_to_slide(w, h, setup.width_in, setup.height_in))
            .unwrap();
    }
    assert_eq!(deck.slide_count(), 2);

    let bytes = deck.write_bytes().unwrap();
    assert!(bytes.starts_with(b"PK\x03\x04"));

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    for part in [
        "[Content_Types].xml",
        "ppt/presentation.xml",
        "ppt/slides/slide1.xml",
        "ppt/slides/slide2.xml",
        "ppt/media/image1.png",
        "ppt/media/image2.png",
    ] {
        assert!(names.iter().any(|name| name == part), "missing {part}");
    }

    let mut presentation = String::new();
    std::io::Read::read_to_string(
        &mut archive.by_name("ppt/presentation.xml").unwrap(),
        &mut presentation,
    )
    .unwrap();
    assert!(presentation.contains(r#"cx="9144000" cy="5143500""#));
}
