use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;

use crate::dom::Element;
use crate::export::{
    file::{self, FileDownloadSink},
    planner::PageSetup,
    slides::{Placement, SlideSetup},
    types::{CaptureOptions, ExportError, PixelBuffer},
};
use crate::notification::DesktopNotifier;
use crate::render::{
    overlay::ConsoleOverlay, pdf::PdfDocumentBackend, pptx::PptxDeckBackend,
    raster::CairoRasterizer,
};

/// Turns an element subtree into pixels.
///
/// The subtree is rendered from its own origin; `options` give the captured
/// area and the oversampling factor.
#[async_trait]
pub trait RasterCapture: Send + Sync {
    async fn capture(
        &self,
        subtree: &Element,
        options: &CaptureOptions,
    ) -> Result<PixelBuffer, ExportError>;
}

/// Paginated document under construction. Coordinates are millimetres.
pub trait DocumentWriter: Send {
    fn page_size_mm(&self) -> (f64, f64);
    fn new_page(&mut self) -> Result<(), ExportError>;
    fn place_image(
        &mut self,
        buffer: &PixelBuffer,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<(), ExportError>;
    /// Finalizes the document into file bytes.
    fn export_bytes(self: Box<Self>) -> Result<Vec<u8>, ExportError>;
}

/// Creates a fresh [`DocumentWriter`] for each export.
pub trait DocumentBackend: Send + Sync {
    fn create(&self, setup: &PageSetup) -> Result<Box<dyn DocumentWriter>, ExportError>;
}

/// One slide of a deck. Coordinates are inches.
pub trait Slide: Send {
    fn place_image(&mut self, buffer: &PixelBuffer, placement: Placement)
    -> Result<(), ExportError>;
}

/// Slide deck under construction.
pub trait SlideDeckWriter: Send {
    fn slide_size_in(&self) -> (f64, f64);
    fn add_slide(&mut self) -> &mut dyn Slide;
    fn slide_count(&self) -> usize;
    fn write_bytes(self: Box<Self>) -> Result<Vec<u8>, ExportError>;
}

/// Creates a fresh [`SlideDeckWriter`] for each export.
pub trait SlideDeckBackend: Send + Sync {
    fn create(&self, setup: &SlideSetup) -> Result<Box<dyn SlideDeckWriter>, ExportError>;
}

/// Hands a finished artifact to the user under a fixed file name.
pub trait DownloadSink: Send + Sync {
    fn deliver(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, ExportError>;
}

/// Busy indicator shown while a job runs.
pub trait OverlayController: Send + Sync {
    fn show_busy(&self, message: &str);
    fn hide(&self);
}

/// User-visible alert channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn alert(&self, summary: &str, body: &str);
}

/// Bundle of capabilities used by the export jobs. Each component can be mocked in tests.
#[derive(Clone)]
pub struct ExportDependencies {
    pub capture: Arc<dyn RasterCapture>,
    pub documents: Arc<dyn DocumentBackend>,
    pub decks: Arc<dyn SlideDeckBackend>,
    pub downloads: Arc<dyn DownloadSink>,
    pub overlay: Arc<dyn OverlayController>,
    pub notifier: Arc<dyn Notifier>,
}

impl ExportDependencies {
    /// Real implementations, delivering files into `output_dir`.
    pub fn with_output_dir(output_dir: &Path) -> Self {
        Self {
            capture: Arc::new(CairoRasterizer),
            documents: Arc::new(PdfDocumentBackend),
            decks: Arc::new(PptxDeckBackend),
            downloads: Arc::new(FileDownloadSink::new(output_dir.to_path_buf())),
            overlay: Arc::new(ConsoleOverlay::default()),
            notifier: Arc::new(DesktopNotifier),
        }
    }
}

impl Default for ExportDependencies {
    fn default() -> Self {
        Self::with_output_dir(&file::default_download_dir())
    }
}
