use std::{
    path::PathBuf,
    sync::{Arc, Mutex as StdMutex, PoisonError},
};

use tokio::{sync::Mutex, task};
use tokio_util::sync::CancellationToken;

use crate::dom::{DashboardHost, Element};
use crate::export::{
    assembler::{assemble_pages, finalize_document},
    dependencies::{DownloadSink, ExportDependencies, OverlayController},
    file::{DOCUMENT_FILENAME, SLIDE_DECK_FILENAME},
    pipeline::{capture_pages, offscreen_wrapper},
    planner::{PageSetup, plan_pages},
    slides::{DEFAULT_WIDGET_MARKERS, SlideSetup, capture_slides, extract_widgets},
    style_guard::StyleGuard,
    types::{
        CaptureOptions, CaptureTarget, ExportError, ExportJob, ExportKind, ExportOutcome,
        ExportState,
    },
};

pub const DOCUMENT_BUSY_MESSAGE: &str = "Generating PDF...";
pub const SLIDE_DECK_BUSY_MESSAGE: &str = "Generating PowerPoint...";
pub const DOCUMENT_FAILURE_MESSAGE: &str = "Error generating PDF. Please try again.";
pub const SLIDE_DECK_FAILURE_MESSAGE: &str = "Error generating PowerPoint. Please try again.";
pub const NO_WIDGETS_MESSAGE: &str = "No charts found in the dashboard";

/// Everything an export needs to know about the dashboard and the output geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSettings {
    /// Id of the dashboard container.
    pub root_id: String,
    /// Classes that mark a widget container.
    pub widget_markers: Vec<String>,
    /// Capture resolution multiplier.
    pub oversampling: f64,
    pub page: PageSetup,
    pub slides: SlideSetup,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            root_id: "dashboard".to_string(),
            widget_markers: DEFAULT_WIDGET_MARKERS
                .iter()
                .map(|marker| marker.to_string())
                .collect(),
            oversampling: 2.0,
            page: PageSetup::default(),
            slides: SlideSetup::default(),
        }
    }
}

/// Ordered stages of a document export. The style guard is held across all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStage {
    Measure,
    Capture,
    Assemble,
    Deliver,
}

impl DocumentStage {
    pub const ORDER: [DocumentStage; 4] = [
        DocumentStage::Measure,
        DocumentStage::Capture,
        DocumentStage::Assemble,
        DocumentStage::Deliver,
    ];

    fn job_state(self) -> ExportState {
        match self {
            DocumentStage::Measure | DocumentStage::Capture => ExportState::Capturing,
            DocumentStage::Assemble | DocumentStage::Deliver => ExportState::Assembling,
        }
    }
}

/// Busy overlay that is hidden exactly once, on close or on drop.
struct BusyOverlay {
    overlay: Arc<dyn OverlayController>,
    open: bool,
}

impl BusyOverlay {
    fn open(overlay: Arc<dyn OverlayController>, message: &str) -> Self {
        overlay.show_busy(message);
        Self {
            overlay,
            open: true,
        }
    }

    fn close(mut self) {
        self.hide();
    }

    fn hide(&mut self) {
        if std::mem::take(&mut self.open) {
            self.overlay.hide();
        }
    }
}

impl Drop for BusyOverlay {
    fn drop(&mut self) {
        self.hide();
    }
}

/// Runs dashboard exports and owns their job state.
///
/// One export is expected at a time per dashboard. Nothing locks against a
/// second concurrent call.
#[derive(Clone)]
pub struct ExportController {
    host: DashboardHost,
    settings: Arc<ExportSettings>,
    dependencies: Arc<ExportDependencies>,
    last_job: Arc<Mutex<Option<ExportJob>>>,
    active_cancel: Arc<StdMutex<Option<CancellationToken>>>,
}

impl ExportController {
    /// Create a controller backed by the real capture and writer implementations.
    pub fn new(host: DashboardHost, settings: ExportSettings) -> Self {
        Self::with_dependencies(host, settings, ExportDependencies::default())
    }

    /// Create a controller with custom dependencies (useful for testing).
    pub fn with_dependencies(
        host: DashboardHost,
        settings: ExportSettings,
        dependencies: ExportDependencies,
    ) -> Self {
        Self {
            host,
            settings: Arc::new(settings),
            dependencies: Arc::new(dependencies),
            last_job: Arc::new(Mutex::new(None)),
            active_cancel: Arc::new(StdMutex::new(None)),
        }
    }

    pub fn host(&self) -> &DashboardHost {
        &self.host
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Cancels the export in flight, if any. Returns whether one was running.
    ///
    /// The running job stops before its next capture and goes through the
    /// same teardown as a failure.
    pub fn cancel(&self) -> bool {
        let active = self
            .active_cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match active.as_ref() {
            Some(token) => {
                log::info!("Cancelling export in progress");
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// The job record of the most recent export call.
    pub async fn last_job(&self) -> Option<ExportJob> {
        self.last_job.lock().await.clone()
    }

    /// Exports the whole dashboard as a paginated document.
    pub async fn export_as_document(&self) -> Result<ExportOutcome, ExportError> {
        let root_id = self.settings.root_id.as_str();
        if !self.host.contains(root_id) {
            log::error!("Dashboard element '{}' not found", root_id);
            return Err(ExportError::RootNotFound(root_id.to_string()));
        }

        log::info!("Starting document export");
        let mut job = ExportJob::new(ExportKind::Document);
        job.advance(ExportState::Capturing)?;
        let cancel = self.begin_job();
        let overlay = BusyOverlay::open(
            Arc::clone(&self.dependencies.overlay),
            DOCUMENT_BUSY_MESSAGE,
        );

        let result = match StyleGuard::acquire(&self.host, root_id) {
            Ok(guard) => {
                let result = self.run_document(&mut job, &cancel).await;
                guard.release();
                result
            }
            Err(err) => Err(err),
        };

        overlay.close();
        self.end_job();
        self.finish(job, result, Some(DOCUMENT_FAILURE_MESSAGE))
            .await
            .map(ExportOutcome::Delivered)
    }

    /// Exports every widget as its own slide.
    pub async fn export_as_slide_deck(&self) -> Result<ExportOutcome, ExportError> {
        let root_id = self.settings.root_id.as_str();
        if !self.host.contains(root_id) {
            log::error!("Dashboard element '{}' not found", root_id);
            return Err(ExportError::RootNotFound(root_id.to_string()));
        }

        log::info!("Starting slide deck export");
        let mut job = ExportJob::new(ExportKind::SlideDeck);
        job.advance(ExportState::Capturing)?;
        let cancel = self.begin_job();
        let overlay = BusyOverlay::open(
            Arc::clone(&self.dependencies.overlay),
            SLIDE_DECK_BUSY_MESSAGE,
        );

        let result = self.run_slide_deck(&mut job, &cancel).await;

        overlay.close();
        self.end_job();
        let result = match result {
            Ok(Some(path)) => Ok(path),
            Ok(None) => return Ok(self.report_no_widgets(job).await),
            Err(err) => Err(err),
        };
        self.finish(job, result, Some(SLIDE_DECK_FAILURE_MESSAGE))
            .await
            .map(ExportOutcome::Delivered)
    }

    /// Saves a single element as a PNG image named `filename`.
    ///
    /// Returns `Ok(None)` without doing anything when the element does not exist.
    pub async fn export_widget_image(
        &self,
        element_id: &str,
        filename: &str,
    ) -> Result<Option<PathBuf>, ExportError> {
        let Some(element) = self.host.clone_element(element_id) else {
            log::warn!("Element '{}' not found, nothing to export", element_id);
            return Ok(None);
        };

        let mut job = ExportJob::new(ExportKind::WidgetImage);
        job.advance(ExportState::Capturing)?;

        let result = self.run_widget_image(&mut job, element, filename).await;
        self.finish(job, result, None).await.map(Some)
    }

    async fn run_widget_image(
        &self,
        job: &mut ExportJob,
        element: Element,
        filename: &str,
    ) -> Result<PathBuf, ExportError> {
        let (width, height) = element.box_size();
        if !(width > 0.0 && height > 0.0) {
            return Err(ExportError::EmptyContainer { width, height });
        }

        let wrapper = offscreen_wrapper(element, width, height);
        let options = CaptureOptions {
            scale: self.settings.oversampling,
            width,
            height,
            background: None,
        };
        let buffer = self.dependencies.capture.capture(&wrapper, &options).await?;

        job.advance(ExportState::Assembling)?;
        deliver(
            Arc::clone(&self.dependencies.downloads),
            filename.to_string(),
            buffer.png,
        )
        .await
    }

    async fn run_document(
        &self,
        job: &mut ExportJob,
        cancel: &CancellationToken,
    ) -> Result<PathBuf, ExportError> {
        let settings = &*self.settings;

        enter_stage(job, DocumentStage::Measure, cancel)?;
        let target = self.measure_root()?;
        let plan = plan_pages(
            target.measured_width,
            target.measured_height,
            settings.page.content_width_mm(),
            settings.page.content_height_mm(),
        )?;

        enter_stage(job, DocumentStage::Capture, cancel)?;
        let pages = capture_pages(
            &target,
            &plan,
            self.dependencies.capture.as_ref(),
            settings.oversampling,
            cancel,
        )
        .await?;

        enter_stage(job, DocumentStage::Assemble, cancel)?;
        let mut writer = self.dependencies.documents.create(&settings.page)?;
        assemble_pages(writer.as_mut(), &plan, &settings.page, &pages)?;
        drop(pages);
        let bytes = finalize_document(writer).await?;

        enter_stage(job, DocumentStage::Deliver, cancel)?;
        deliver(
            Arc::clone(&self.dependencies.downloads),
            DOCUMENT_FILENAME.to_string(),
            bytes,
        )
        .await
    }

    /// `Ok(None)` means no widget produced a slide and nothing was written.
    async fn run_slide_deck(
        &self,
        job: &mut ExportJob,
        cancel: &CancellationToken,
    ) -> Result<Option<PathBuf>, ExportError> {
        let settings = &*self.settings;

        let widgets = extract_widgets(&self.host, &settings.root_id, &settings.widget_markers)?;
        log::info!("Found {} widget(s) to export", widgets.len());
        if widgets.is_empty() {
            return Ok(None);
        }

        let mut deck = self.dependencies.decks.create(&settings.slides)?;
        let added = capture_slides(
            widgets,
            deck.as_mut(),
            self.dependencies.capture.as_ref(),
            &settings.slides,
            settings.oversampling,
            cancel,
        )
        .await?;
        if added == 0 {
            return Ok(None);
        }

        job.advance(ExportState::Assembling)?;
        if cancel.is_cancelled() {
            return Err(ExportError::Cancelled);
        }
        let bytes = task::spawn_blocking(move || deck.write_bytes())
            .await
            .map_err(|e| ExportError::Task(format!("Slide deck write task failed: {}", e)))??;

        deliver(
            Arc::clone(&self.dependencies.downloads),
            SLIDE_DECK_FILENAME.to_string(),
            bytes,
        )
        .await
        .map(Some)
    }

    fn measure_root(&self) -> Result<CaptureTarget, ExportError> {
        let root_id = self.settings.root_id.as_str();
        self.host
            .read(|dom| {
                dom.get_element_by_id(root_id).map(|root| CaptureTarget {
                    element: root.clone(),
                    measured_width: root.scroll_width(),
                    measured_height: root.scroll_height(),
                })
            })
            .ok_or_else(|| ExportError::RootNotFound(root_id.to_string()))
    }

    async fn report_no_widgets(&self, mut job: ExportJob) -> ExportOutcome {
        log::warn!("{}", NO_WIDGETS_MESSAGE);
        job.fail(&ExportError::NoWidgets);
        self.dependencies
            .notifier
            .alert(
                NO_WIDGETS_MESSAGE,
                "Add at least one chart to the dashboard and try again.",
            )
            .await;
        *self.last_job.lock().await = Some(job);
        ExportOutcome::NoWidgets
    }

    /// Records the terminal state and raises the alert for failures.
    async fn finish<T>(
        &self,
        mut job: ExportJob,
        result: Result<T, ExportError>,
        failure_summary: Option<&str>,
    ) -> Result<T, ExportError> {
        let result = result.and_then(|value| job.advance(ExportState::Succeeded).map(|()| value));

        match &result {
            Ok(_) => log::info!("{:?} export finished", job.kind),
            Err(ExportError::Cancelled) => {
                log::info!("{:?} export cancelled", job.kind);
                job.fail(&ExportError::Cancelled);
            }
            Err(err) => {
                log::error!("{:?} export failed: {}", job.kind, err);
                job.fail(err);
                if let Some(summary) = failure_summary {
                    self.dependencies
                        .notifier
                        .alert(summary, &err.to_string())
                        .await;
                }
            }
        }

        *self.last_job.lock().await = Some(job);
        result
    }

    fn begin_job(&self) -> CancellationToken {
        let token = CancellationToken::new();
        *self
            .active_cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        token
    }

    fn end_job(&self) {
        self.active_cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

fn enter_stage(
    job: &mut ExportJob,
    stage: DocumentStage,
    cancel: &CancellationToken,
) -> Result<(), ExportError> {
    if cancel.is_cancelled() {
        return Err(ExportError::Cancelled);
    }
    let position = DocumentStage::ORDER
        .iter()
        .position(|candidate| *candidate == stage)
        .unwrap_or_default();
    log::debug!(
        "Document export stage {}/{}: {:?}",
        position + 1,
        DocumentStage::ORDER.len(),
        stage
    );
    if job.state != stage.job_state() {
        job.advance(stage.job_state())?;
    }
    Ok(())
}

async fn deliver(
    sink: Arc<dyn DownloadSink>,
    filename: String,
    bytes: Vec<u8>,
) -> Result<PathBuf, ExportError> {
    task::spawn_blocking(move || sink.deliver(&filename, &bytes))
        .await
        .map_err(|e| ExportError::Task(format!("Delivery task failed: {}", e)))?
}
