//! Data types for dashboard export jobs.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::dom::{Color, Element};

/// Which artifact an export job produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// Multi-page paginated document.
    Document,
    /// One slide per widget.
    SlideDeck,
    /// A single widget as a PNG image.
    WidgetImage,
}

/// Lifecycle of one export job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportState {
    Idle,
    Capturing,
    Assembling,
    Succeeded,
    Failed,
}

impl ExportState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ExportState::Succeeded | ExportState::Failed)
    }

    /// Valid moves: `Idle → Capturing → Assembling → Succeeded`, plus
    /// `Failed` from any non-terminal state.
    pub fn can_transition_to(self, next: ExportState) -> bool {
        match (self, next) {
            (ExportState::Idle, ExportState::Capturing)
            | (ExportState::Capturing, ExportState::Assembling)
            | (ExportState::Assembling, ExportState::Succeeded) => true,
            (current, ExportState::Failed) => !current.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for ExportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportState::Idle => "idle",
            ExportState::Capturing => "capturing",
            ExportState::Assembling => "assembling",
            ExportState::Succeeded => "succeeded",
            ExportState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Per-invocation job record. Nothing about it outlives the export call
/// except the copy kept for [`crate::export::ExportController::last_job`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportJob {
    pub kind: ExportKind,
    pub state: ExportState,
    /// Message of the error that failed the job.
    pub error: Option<String>,
}

impl ExportJob {
    pub fn new(kind: ExportKind) -> Self {
        Self {
            kind,
            state: ExportState::Idle,
            error: None,
        }
    }

    pub fn advance(&mut self, next: ExportState) -> Result<(), ExportError> {
        if !self.state.can_transition_to(next) {
            return Err(ExportError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        log::debug!("{:?} export: {} -> {}", self.kind, self.state, next);
        self.state = next;
        Ok(())
    }

    /// Marks the job failed. A job that already reached a terminal state keeps it.
    pub fn fail(&mut self, error: &ExportError) {
        if self.advance(ExportState::Failed).is_ok() {
            self.error = Some(error.to_string());
        }
    }
}

/// Measured snapshot of the container about to be captured.
#[derive(Debug, Clone)]
pub struct CaptureTarget {
    /// Full-fidelity clone of the container.
    pub element: Element,
    pub measured_width: f64,
    pub measured_height: f64,
}

/// One vertical slice of the container, mapped to one document page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRegion {
    pub index: usize,
    pub vertical_offset_px: f64,
    /// Height of this slice; only the final region may be shorter than the viewport.
    pub viewport_height_px: f64,
}

/// Encoded raster produced by a capture.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    /// PNG-encoded pixels.
    pub png: Vec<u8>,
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("png_bytes", &self.png.len())
            .finish()
    }
}

/// A widget container found in the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetBlock {
    /// The marker class that matched.
    pub selector_class: String,
    pub bounding_width_px: f64,
    pub bounding_height_px: f64,
}

impl WidgetBlock {
    pub fn has_area(&self) -> bool {
        self.bounding_width_px > 0.0 && self.bounding_height_px > 0.0
    }
}

/// Sizing hints handed to the raster capture primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureOptions {
    /// Oversampling factor applied to the CSS pixel size.
    pub scale: f64,
    /// Captured area in CSS pixels, measured from the subtree origin.
    pub width: f64,
    pub height: f64,
    /// Solid fill painted before the subtree.
    pub background: Option<Color>,
}

/// How an export call ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The artifact was written to this path.
    Delivered(PathBuf),
    /// The slide export found no widget containers; nothing was written.
    NoWidgets,
}

/// Errors that can occur while exporting a dashboard.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Dashboard element '{0}' not found")]
    RootNotFound(String),

    #[error("No charts found in the dashboard")]
    NoWidgets,

    #[error("Container has no measurable size ({width}x{height})")]
    EmptyContainer { width: f64, height: f64 },

    #[error("Raster capture failed: {0}")]
    Capture(String),

    #[error("Image processing error: {0}")]
    Image(String),

    #[error("Document assembly failed: {0}")]
    Assembly(String),

    #[error("Failed to write export: {0}")]
    Write(#[from] std::io::Error),

    #[error("Slide deck packaging failed: {0}")]
    Zip(String),

    #[error("Export cancelled")]
    Cancelled,

    #[error("Invalid export state transition: {from} -> {to}")]
    InvalidTransition { from: ExportState, to: ExportState },

    #[error("Export task failed: {0}")]
    Task(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_transitions() {
        let mut job = ExportJob::new(ExportKind::Document);
        job.advance(ExportState::Capturing).unwrap();
        job.advance(ExportState::Assembling).unwrap();
        job.advance(ExportState::Succeeded).unwrap();
        assert!(job.state.is_terminal());
        assert!(job.error.is_none());
    }

    #[test]
    fn skipping_states_is_rejected() {
        let mut job = ExportJob::new(ExportKind::SlideDeck);
        let err = job.advance(ExportState::Assembling).unwrap_err();
        assert!(matches!(
            err,
            ExportError::InvalidTransition {
                from: ExportState::Idle,
                to: ExportState::Assembling
            }
        ));
        job.advance(ExportState::Capturing).unwrap();
        assert!(job.advance(ExportState::Succeeded).is_err());
    }

    #[test]
    fn fail_records_error_once() {
        let mut job = ExportJob::new(ExportKind::Document);
        job.advance(ExportState::Capturing).unwrap();
        job.fail(&ExportError::Capture("boom".into()));
        assert_eq!(job.state, ExportState::Failed);
        assert_eq!(job.error.as_deref(), Some("Raster capture failed: boom"));

        job.fail(&ExportError::Cancelled);
        assert_eq!(job.error.as_deref(), Some("Raster capture failed: boom"));
    }
}
