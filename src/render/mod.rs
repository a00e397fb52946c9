//! Concrete renderers and writers behind the export traits.

pub mod overlay;
pub mod pdf;
pub mod pptx;
pub mod raster;

pub use overlay::ConsoleOverlay;
pub use pdf::{PdfDocumentBackend, PdfDocumentWriter};
pub use pptx::{PptxDeckBackend, PptxDeckWriter};
pub use raster::{CairoRasterizer, render_png};
