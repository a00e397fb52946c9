//! Minimal PresentationML package writer.
//!
//! Each slide carries only pictures on a solid background. The package holds
//! one master, one blank layout and a plain theme.

use std::io::{Cursor, Write};

use chrono::{SecondsFormat, Utc};
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::dom::Color;
use crate::export::{
    dependencies::{Slide, SlideDeckBackend, SlideDeckWriter},
    slides::{Placement, SlideSetup},
    types::{ExportError, PixelBuffer},
};

/// English Metric Units per inch.
const EMU_PER_INCH: f64 = 914_400.0;

const APP_NAME: &str = "dashexport";

fn emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH).round() as i64
}

fn hex_rgb(color: Color) -> String {
    let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "{:02X}{:02X}{:02X}",
        channel(color.r),
        channel(color.g),
        channel(color.b)
    )
}

/// Creates [`PptxDeckWriter`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct PptxDeckBackend;

impl SlideDeckBackend for PptxDeckBackend {
    fn create(&self, setup: &SlideSetup) -> Result<Box<dyn SlideDeckWriter>, ExportError> {
        if setup.width_in <= 0.0 || setup.height_in <= 0.0 {
            return Err(ExportError::Assembly(format!(
                "invalid slide size {}x{} in",
                setup.width_in, setup.height_in
            )));
        }
        Ok(Box::new(PptxDeckWriter::new(*setup)))
    }
}

#[derive(Debug, Clone)]
struct Picture {
    png: Vec<u8>,
    placement: Placement,
}

/// Slide of a [`PptxDeckWriter`].
#[derive(Debug, Clone, Default)]
pub struct PptxSlide {
    pictures: Vec<Picture>,
}

impl PptxSlide {
    pub fn picture_count(&self) -> usize {
        self.pictures.len()
    }
}

impl Slide for PptxSlide {
    fn place_image(
        &mut self,
        buffer: &PixelBuffer,
        placement: Placement,
    ) -> Result<(), ExportError> {
        if buffer.png.is_empty() {
            return Err(ExportError::Image("empty slide image".to_string()));
        }
        self.pictures.push(Picture {
            png: buffer.png.clone(),
            placement,
        });
        Ok(())
    }
}

/// Slide deck kept in memory until [`SlideDeckWriter::write_bytes`] packages it.
#[derive(Debug, Clone)]
pub struct PptxDeckWriter {
    setup: SlideSetup,
    slides: Vec<PptxSlide>,
}

impl PptxDeckWriter {
    pub fn new(setup: SlideSetup) -> Self {
        Self {
            setup,
            slides: Vec::new(),
        }
    }

    pub fn slides(&self) -> &[PptxSlide] {
        &self.slides
    }
}

impl SlideDeckWriter for PptxDeckWriter {
    fn slide_size_in(&self) -> (f64, f64) {
        (self.setup.width_in, self.setup.height_in)
    }

    fn add_slide(&mut self) -> &mut dyn Slide {
        self.slides.push(PptxSlide::default());
        let index = self.slides.len() - 1;
        &mut self.slides[index]
    }

    fn slide_count(&self) -> usize {
        self.slides.len()
    }

    fn write_bytes(self: Box<Self>) -> Result<Vec<u8>, ExportError> {
        let mut package = Package::new();

        package.add("[Content_Types].xml", content_types(self.slides.len()))?;
        package.add("_rels/.rels", ROOT_RELS.to_string())?;
        package.add("docProps/core.xml", core_properties())?;
        package.add("docProps/app.xml", app_properties(self.slides.len()))?;
        package.add("ppt/presentation.xml", presentation(&self.setup, self.slides.len()))?;
        package.add(
            "ppt/_rels/presentation.xml.rels",
            presentation_rels(self.slides.len()),
        )?;
        package.add("ppt/slideMasters/slideMaster1.xml", SLIDE_MASTER.to_string())?;
        package.add(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            SLIDE_MASTER_RELS.to_string(),
        )?;
        package.add("ppt/slideLayouts/slideLayout1.xml", SLIDE_LAYOUT.to_string())?;
        package.add(
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            SLIDE_LAYOUT_RELS.to_string(),
        )?;
        package.add("ppt/theme/theme1.xml", THEME.to_string())?;

        let background = hex_rgb(self.setup.background);
        let mut media_index = 0usize;
        for (slide_index, slide) in self.slides.iter().enumerate() {
            let number = slide_index + 1;
            let mut media = Vec::with_capacity(slide.pictures.len());
            for picture in &slide.pictures {
                media_index += 1;
                let name = format!("image{media_index}.png");
                package.add_bytes(&format!("ppt/media/{name}"), &picture.png)?;
                media.push(name);
            }
            package.add(
                &format!("ppt/slides/slide{number}.xml"),
                slide_xml(slide, &background),
            )?;
            package.add(
                &format!("ppt/slides/_rels/slide{number}.xml.rels"),
                slide_rels(&media),
            )?;
        }

        let bytes = package.finish()?;
        log::debug!(
            "Packaged slide deck: {} slide(s), {} image(s), {} bytes",
            self.slides.len(),
            media_index,
            bytes.len()
        );
        Ok(bytes)
    }
}

struct Package {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
}

impl Package {
    fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
        }
    }

    fn add(&mut self, name: &str, xml: String) -> Result<(), ExportError> {
        self.add_bytes(name, xml.as_bytes())
    }

    fn add_bytes(&mut self, name: &str, bytes: &[u8]) -> Result<(), ExportError> {
        self.zip
            .start_file(name, self.options)
            .map_err(|e| ExportError::Zip(format!("{name}: {e}")))?;
        self.zip.write_all(bytes)?;
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>, ExportError> {
        let cursor = self
            .zip
            .finish()
            .map_err(|e| ExportError::Zip(e.to_string()))?;
        Ok(cursor.into_inner())
    }
}

fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

fn content_types(slide_count: usize) -> String {
    let mut xml = format!(
        "{XML_DECL}<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
<Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
<Default Extension=\"xml\" ContentType=\"application/xml\"/>\
<Default Extension=\"png\" ContentType=\"image/png\"/>\
<Override PartName=\"/ppt/presentation.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml\"/>\
<Override PartName=\"/ppt/slideMasters/slideMaster1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml\"/>\
<Override PartName=\"/ppt/slideLayouts/slideLayout1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml\"/>\
<Override PartName=\"/ppt/theme/theme1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.theme+xml\"/>\
<Override PartName=\"/docProps/core.xml\" ContentType=\"application/vnd.openxmlformats-package.core-properties+xml\"/>\
<Override PartName=\"/docProps/app.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.extended-properties+xml\"/>"
    );
    for number in 1..=slide_count {
        xml.push_str(&format!(
            "<Override PartName=\"/ppt/slides/slide{number}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slide+xml\"/>"
        ));
    }
    xml.push_str("</Types>");
    xml
}

const ROOT_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>"#,
    r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>"#,
    r#"<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>"#,
    r#"</Relationships>"#
);

fn core_properties() -> String {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    format!(
        "{XML_DECL}<cp:coreProperties xmlns:cp=\"http://schemas.openxmlformats.org/package/2006/metadata/core-properties\" \
xmlns:dc=\"http://purl.org/dc/elements/1.1/\" xmlns:dcterms=\"http://purl.org/dc/terms/\" \
xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">\
<dc:title>{title}</dc:title><dc:creator>{creator}</dc:creator>\
<dcterms:created xsi:type=\"dcterms:W3CDTF\">{now}</dcterms:created>\
<dcterms:modified xsi:type=\"dcterms:W3CDTF\">{now}</dcterms:modified>\
</cp:coreProperties>",
        title = xml_escape("Dashboard charts"),
        creator = APP_NAME,
    )
}

fn app_properties(slide_count: usize) -> String {
    format!(
        "{XML_DECL}<Properties xmlns=\"http://schemas.openxmlformats.org/officeDocument/2006/extended-properties\">\
<Application>{APP_NAME}</Application><Slides>{slide_count}</Slides></Properties>"
    )
}

fn presentation(setup: &SlideSetup, slide_count: usize) -> String {
    let mut slide_ids = String::new();
    for index in 0..slide_count {
        // Relationship ids 1 and 2 belong to the master and the theme.
        slide_ids.push_str(&format!(
            "<p:sldId id=\"{}\" r:id=\"rId{}\"/>",
            256 + index,
            index + 3
        ));
    }
    let slide_list = if slide_ids.is_empty() {
        String::new()
    } else {
        format!("<p:sldIdLst>{slide_ids}</p:sldIdLst>")
    };

    format!(
        "{XML_DECL}<p:presentation xmlns:a=\"{NS_A}\" xmlns:r=\"{NS_R}\" xmlns:p=\"{NS_P}\" saveSubsetFonts=\"1\">\
<p:sldMasterIdLst><p:sldMasterId id=\"2147483648\" r:id=\"rId1\"/></p:sldMasterIdLst>\
{slide_list}\
<p:sldSz cx=\"{cx}\" cy=\"{cy}\"/><p:notesSz cx=\"6858000\" cy=\"9144000\"/>\
</p:presentation>",
        cx = emu(setup.width_in),
        cy = emu(setup.height_in),
    )
}

fn presentation_rels(slide_count: usize) -> String {
    let mut xml = format!(
        "{XML_DECL}<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
<Relationship Id=\"rId1\" Type=\"{REL_BASE}/slideMaster\" Target=\"slideMasters/slideMaster1.xml\"/>\
<Relationship Id=\"rId2\" Type=\"{REL_BASE}/theme\" Target=\"theme/theme1.xml\"/>"
    );
    for index in 0..slide_count {
        xml.push_str(&format!(
            "<Relationship Id=\"rId{}\" Type=\"{REL_BASE}/slide\" Target=\"slides/slide{}.xml\"/>",
            index + 3,
            index + 1
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn slide_xml(slide: &PptxSlide, background: &str) -> String {
    let mut shapes = String::new();
    for (index, picture) in slide.pictures.iter().enumerate() {
        let Placement { x, y, w, h } = picture.placement;
        // Shape id 1 is the group root.
        let shape_id = index + 2;
        shapes.push_str(&format!(
            "<p:pic><p:nvPicPr><p:cNvPr id=\"{shape_id}\" name=\"Chart {n}\"/>\
<p:cNvPicPr><a:picLocks noChangeAspect=\"1\"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>\
<p:blipFill><a:blip r:embed=\"rId{rel}\"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>\
<p:spPr><a:xfrm><a:off x=\"{ox}\" y=\"{oy}\"/><a:ext cx=\"{cx}\" cy=\"{cy}\"/></a:xfrm>\
<a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></p:spPr></p:pic>",
            n = index + 1,
            rel = index + 2,
            ox = emu(x),
            oy = emu(y),
            cx = emu(w),
            cy = emu(h),
        ));
    }

    format!(
        "{XML_DECL}<p:sld xmlns:a=\"{NS_A}\" xmlns:r=\"{NS_R}\" xmlns:p=\"{NS_P}\"><p:cSld>\
<p:bg><p:bgPr><a:solidFill><a:srgbClr val=\"{background}\"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>\
<p:spTree><p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>\
<p:grpSpPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"0\" cy=\"0\"/><a:chOff x=\"0\" y=\"0\"/><a:chExt cx=\"0\" cy=\"0\"/></a:xfrm></p:grpSpPr>\
{shapes}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"
    )
}

fn slide_rels(media: &[String]) -> String {
    let mut xml = format!(
        "{XML_DECL}<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
<Relationship Id=\"rId1\" Type=\"{REL_BASE}/slideLayout\" Target=\"../slideLayouts/slideLayout1.xml\"/>"
    );
    for (index, name) in media.iter().enumerate() {
        xml.push_str(&format!(
            "<Relationship Id=\"rId{}\" Type=\"{REL_BASE}/image\" Target=\"../media/{}\"/>",
            index + 2,
            name
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

const SLIDE_MASTER: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<p:sldMaster xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#,
    r#"<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg>"#,
    r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#,
    r#"</p:spTree></p:cSld>"#,
    r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#,
    r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>"#,
    r#"</p:sldMaster>"#
);

const SLIDE_MASTER_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>"#,
    r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="../theme/theme1.xml"/>"#,
    r#"</Relationships>"#
);

const SLIDE_LAYOUT: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" type="blank" preserve="1">"#,
    r#"<p:cSld name="Blank">"#,
    r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#,
    r#"</p:spTree></p:cSld>"#,
    r#"<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>"#,
    r#"</p:sldLayout>"#
);

const SLIDE_LAYOUT_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="../slideMasters/slideMaster1.xml"/>"#,
    r#"</Relationships>"#
);

const THEME: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme"><a:themeElements>"#,
    r#"<a:clrScheme name="Office">"#,
    r#"<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>"#,
    r#"<a:dk2><a:srgbClr val="44546A"/></a:dk2><a:lt2><a:srgbClr val="E7E6E6"/></a:lt2>"#,
    r#"<a:accent1><a:srgbClr val="4472C4"/></a:accent1><a:accent2><a:srgbClr val="ED7D31"/></a:accent2>"#,
    r#"<a:accent3><a:srgbClr val="A5A5A5"/></a:accent3><a:accent4><a:srgbClr val="FFC000"/></a:accent4>"#,
    r#"<a:accent5><a:srgbClr val="5B9BD5"/></a:accent5><a:accent6><a:srgbClr val="70AD47"/></a:accent6>"#,
    r#"<a:hlink><a:srgbClr val="0563C1"/></a:hlink><a:folHlink><a:srgbClr val="954F72"/></a:folHlink>"#,
    r#"</a:clrScheme>"#,
    r#"<a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>"#,
    r#"<a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme>"#,
    r#"<a:fmtScheme name="Office">"#,
    r#"<a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:fillStyleLst>"#,
    r#"<a:lnStyleLst><a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="12700"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="19050"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst>"#,
    r#"<a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst>"#,
    r#"<a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:bgFillStyleLst>"#,
    r#"</a:fmtScheme></a:themeElements></a:theme>"#
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::color::WHITE;

    #[test]
    fn widescreen_slide_size_in_emu() {
        let xml = presentation(&SlideSetup::WIDESCREEN, 2);
        assert!(xml.contains(r#"<p:sldSz cx="9144000" cy="5143500"/>"#));
        assert!(xml.contains(r#"<p:sldId id="256" r:id="rId3"/>"#));
        assert!(xml.contains(r#"<p:sldId id="257" r:id="rId4"/>"#));
    }

    #[test]
    fn background_is_upper_hex() {
        assert_eq!(hex_rgb(WHITE), "FFFFFF");
        assert_eq!(hex_rgb(Color::from_rgb8(0x12, 0xab, 0x00)), "12AB00");
    }

    #[test]
    fn slide_pictures_reference_their_media() {
        let mut slide = PptxSlide::default();
        let buffer = PixelBuffer {
            width: 2,
            height: 1,
            png: vec![0x89],
        };
        slide
            .place_image(
                &buffer,
                Placement {
                    x: 0.0,
                    y: 0.3125,
                    w: 10.0,
                    h: 5.0,
                },
            )
            .unwrap();

        let xml = slide_xml(&slide, "FFFFFF");
        assert!(xml.contains(r#"<a:blip r:embed="rId2"/>"#));
        assert!(xml.contains(r#"<a:off x="0" y="285750"/>"#));
        assert!(xml.contains(r#"<a:ext cx="9144000" cy="4572000"/>"#));

        let rels = slide_rels(&["image1.png".to_string()]);
        assert!(rels.contains(r#"Id="rId2""#));
        assert!(rels.contains("../media/image1.png"));
    }

    #[test]
    fn empty_image_is_rejected() {
        let mut slide = PptxSlide::default();
        let buffer = PixelBuffer {
            width: 0,
            height: 0,
            png: Vec::new(),
        };
        let placement = Placement {
            x: 0.0,
            y: 0.0,
            w: 1.0,
            h: 1.0,
        };
        assert!(slide.place_image(&buffer, placement).is_err());
        assert_eq!(slide.picture_count(), 0);
    }

    #[test]
    fn package_starts_with_zip_signature() {
        let mut deck: Box<dyn SlideDeckWriter> = PptxDeckBackend
            .create(&SlideSetup::default())
            .unwrap();
        let buffer = PixelBuffer {
            width: 1,
            height: 1,
            png: vec![1, 2, 3, 4],
        };
        let placement = fit_placement();
        deck.add_slide().place_image(&buffer, placement).unwrap();
        assert_eq!(deck.slide_count(), 1);

        let bytes = deck.write_bytes().unwrap();
        assert_eq!(&bytes[0..4], b"PK\x03\x04");
    }

    fn fit_placement() -> Placement {
        crate::export::fit_to_slide(800.0, 400.0, 10.0, 5.625)
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(xml_escape("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }
}
