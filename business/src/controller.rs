//! The generation-and-history state machine.
//!
//! [`GenerationController`] owns the renderer, the preview, the in-memory
//! history and its durable mirror. It is a plain value owned by the UI
//! composition root; every operation runs on the UI thread between frames.
//!
//! A form submission is split in three so the render step can run elsewhere:
//!
//! 1. [`begin`](GenerationController::begin) validates and raises the busy flag,
//! 2. [`RenderJob::run`] invokes the renderer (any thread),
//! 3. [`complete`](GenerationController::complete) applies preview/history
//!    side effects and clears the busy flag.
//!
//! [`submit`](GenerationController::submit) does all three inline.

use chrono::Utc;

use crate::color::WHITE;
use crate::config::BusinessConfig;
use crate::download::{DownloadSink, download_filename};
use crate::error::{DownloadError, GenerateError, PersistenceError, RenderError, ValidationErrors};
use crate::history::{HistoryList, HistoryRecord, HistoryStore};
use crate::render::{QrRenderer, RenderOptions, RenderedImage};
use crate::request::GenerationRequest;
use crate::storage::KeyValueStore;

pub const RENDER_FAILED_TITLE: &str = "Error";
pub const RENDER_FAILED_MESSAGE: &str =
    "Failed to generate QR code. The text might be too long for the selected size.";
pub const NO_PREVIEW_TITLE: &str = "No QR Code";
pub const NO_PREVIEW_MESSAGE: &str = "Please generate a QR code first.";
pub const DOWNLOAD_FAILED_TITLE: &str = "Download failed";
pub const STORAGE_DEGRADED_TITLE: &str = "History not saved";
pub const STORAGE_DEGRADED_MESSAGE: &str =
    "Local storage is unavailable. History is kept for this session only.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Error,
    Info,
}

/// A dismissible toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
}

/// The request behind the current preview, and its transparent-background render.
#[derive(Debug, Clone)]
pub struct Preview {
    pub request: GenerationRequest,
    pub image: RenderedImage,
}

/// What a download applies to.
#[derive(Debug, Clone, Copy)]
pub enum DownloadTarget<'a> {
    /// The image currently shown in the preview.
    Preview,
    /// A history entry, rendered on demand.
    Record(&'a HistoryRecord),
}

/// One pending renderer invocation.
#[derive(Debug, Clone)]
pub struct RenderJob {
    request: GenerationRequest,
    options: RenderOptions,
}

impl RenderJob {
    pub fn request(&self) -> &GenerationRequest {
        &self.request
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn run<R: QrRenderer + ?Sized>(&self, renderer: &R) -> Result<RenderedImage, RenderError> {
        renderer.render(&self.request.text, &self.options)
    }
}

pub struct GenerationController<R, S, D> {
    config: BusinessConfig,
    renderer: R,
    store: HistoryStore<S>,
    downloads: D,
    history: HistoryList,
    preview: Option<Preview>,
    preview_revision: u64,
    busy: bool,
    validation: ValidationErrors,
    notifications: Vec<Notification>,
    next_notification_id: u64,
    persistence_degraded: bool,
}

impl<R, S, D> GenerationController<R, S, D>
where
    R: QrRenderer,
    S: KeyValueStore,
    D: DownloadSink,
{
    /// Loads the persisted history; a missing or corrupt slot starts empty.
    /// Unreadable storage also starts empty and is not written to this session.
    pub fn new(config: BusinessConfig, renderer: R, backend: S, downloads: D) -> Self {
        let store = HistoryStore::with_key(backend, config.storage_key.clone());
        let loaded = store.try_load();

        let mut controller = Self {
            config,
            renderer,
            store,
            downloads,
            history: HistoryList::new(),
            preview: None,
            preview_revision: 0,
            busy: false,
            validation: ValidationErrors::default(),
            notifications: Vec::new(),
            next_notification_id: 0,
            persistence_degraded: false,
        };

        match loaded {
            Ok(history) => controller.history = history,
            Err(err @ PersistenceError::Corrupt(_)) => {
                log::error!("discarding stored history: {err}");
            }
            Err(err) => controller.on_persistence_error(&err),
        }
        log::info!("history restored with {} records", controller.history.len());
        controller
    }

    pub fn config(&self) -> &BusinessConfig {
        &self.config
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn store(&self) -> &HistoryStore<S> {
        &self.store
    }

    pub fn downloads(&self) -> &D {
        &self.downloads
    }

    pub fn history(&self) -> &HistoryList {
        &self.history
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    /// Bumped every time the preview changes.
    pub fn preview_revision(&self) -> u64 {
        self.preview_revision
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Field errors from the last submission; empty once a submission validates.
    pub fn validation_errors(&self) -> &ValidationErrors {
        &self.validation
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// True once durable storage failed to read or write this session.
    pub fn persistence_degraded(&self) -> bool {
        self.persistence_degraded
    }

    fn preview_job(&self, request: &GenerationRequest) -> Result<RenderJob, GenerateError> {
        request.validate().map_err(GenerateError::Validation)?;
        let options = RenderOptions::preview(request, self.config.margin)?;
        Ok(RenderJob {
            request: request.clone(),
            options,
        })
    }

    /// Validates and renders `request` with a transparent background.
    ///
    /// Touches neither the preview nor the history.
    pub fn generate(&self, request: &GenerationRequest) -> Result<RenderedImage, GenerateError> {
        let job = self.preview_job(request)?;
        Ok(job.run(&self.renderer)?)
    }

    /// Starts a form submission. Fails with [`GenerateError::Busy`] while
    /// another submission is in flight.
    pub fn begin(&mut self, request: GenerationRequest) -> Result<RenderJob, GenerateError> {
        if self.busy {
            log::debug!("ignoring submission while busy");
            return Err(GenerateError::Busy);
        }

        let job = match self.preview_job(&request) {
            Ok(job) => job,
            Err(err) => {
                if let Some(errors) = err.validation() {
                    self.validation = errors.clone();
                }
                return Err(err);
            }
        };

        self.validation = ValidationErrors::default();
        self.busy = true;
        Ok(job)
    }

    /// Finishes a submission started by [`begin`](Self::begin).
    pub fn complete(
        &mut self,
        job: RenderJob,
        outcome: Result<RenderedImage, RenderError>,
    ) -> Result<(), GenerateError> {
        self.busy = false;

        match outcome {
            Ok(image) => {
                log::info!(
                    "generated {} QR code for {} bytes of text",
                    job.request.size,
                    job.request.text.len()
                );
                self.history.push(HistoryRecord::now(job.request.clone()));
                self.set_preview(job.request, image);
                self.persist();
                Ok(())
            }
            Err(err) => {
                log::warn!("QR generation failed: {err}");
                self.notify(NotificationKind::Error, RENDER_FAILED_TITLE, RENDER_FAILED_MESSAGE);
                Err(err.into())
            }
        }
    }

    /// Validate, render, update the preview and record the generation.
    pub fn submit(&mut self, request: GenerationRequest) -> Result<(), GenerateError> {
        let job = self.begin(request)?;
        let outcome = job.run(&self.renderer);
        self.complete(job, outcome)
    }

    /// Renders a history entry again into the preview. History is left as is.
    pub fn regenerate(&mut self, record: &HistoryRecord) -> Result<RenderedImage, GenerateError> {
        match self.generate(&record.request) {
            Ok(image) => {
                self.set_preview(record.request.clone(), image.clone());
                Ok(image)
            }
            Err(err) => {
                log::warn!("regenerating history entry failed: {err}");
                if matches!(err, GenerateError::Render(_)) {
                    self.notify(
                        NotificationKind::Error,
                        RENDER_FAILED_TITLE,
                        RENDER_FAILED_MESSAGE,
                    );
                }
                Err(err)
            }
        }
    }

    /// A thumbnail render for `record`; runs without the busy flag.
    pub fn thumbnail_job(&self, record: &HistoryRecord) -> Result<RenderJob, GenerateError> {
        self.preview_job(&record.request)
    }

    /// Saves a PNG with an opaque white background. Failures become toasts.
    pub fn download(&mut self, target: DownloadTarget<'_>) {
        let image = match target {
            DownloadTarget::Preview => match &self.preview {
                Some(preview) => preview.image.flatten_onto(WHITE),
                None => {
                    self.notify(NotificationKind::Error, NO_PREVIEW_TITLE, NO_PREVIEW_MESSAGE);
                    return;
                }
            },
            DownloadTarget::Record(record) => {
                let rendered = RenderOptions::download(&record.request, self.config.margin)
                    .and_then(|options| self.renderer.render(&record.request.text, &options));
                match rendered {
                    Ok(image) => image,
                    Err(err) => {
                        log::warn!("rendering history entry for download failed: {err}");
                        self.notify(
                            NotificationKind::Error,
                            RENDER_FAILED_TITLE,
                            RENDER_FAILED_MESSAGE,
                        );
                        return;
                    }
                }
            }
        };

        let filename = download_filename(Utc::now());
        if let Err(err) = self.save_png(&filename, &image) {
            log::warn!("download of {filename} failed: {err}");
            self.notify(NotificationKind::Error, DOWNLOAD_FAILED_TITLE, err.to_string());
        }
    }

    fn save_png(&self, filename: &str, image: &RenderedImage) -> Result<(), DownloadError> {
        let png = image.to_png()?;
        self.downloads.save(filename, &png)
    }

    /// Empties the history and persists the empty list.
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.persist();
    }

    pub fn dismiss(&mut self, id: u64) {
        self.notifications.retain(|n| n.id != id);
    }

    fn set_preview(&mut self, request: GenerationRequest, image: RenderedImage) {
        self.preview = Some(Preview { request, image });
        self.preview_revision += 1;
    }

    fn persist(&mut self) {
        if self.persistence_degraded {
            log::debug!("storage unavailable this session, keeping history in memory");
            return;
        }
        if let Err(err) = self.store.save(&self.history) {
            self.on_persistence_error(&err);
        }
    }

    fn on_persistence_error(&mut self, err: &PersistenceError) {
        log::warn!("history will only be kept in memory: {err}");
        self.persistence_degraded = true;
        self.notify(
            NotificationKind::Info,
            STORAGE_DEGRADED_TITLE,
            STORAGE_DEGRADED_MESSAGE,
        );
    }

    fn notify(&mut self, kind: NotificationKind, title: &str, description: impl Into<String>) {
        self.next_notification_id += 1;
        self.notifications.push(Notification {
            id: self.next_notification_id,
            kind,
            title: title.to_owned(),
            description: description.into(),
        });
    }
}
