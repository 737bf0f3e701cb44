use egui::TextureHandle;
use qrgenie_business::{
    BusinessConfig, DownloadSink, DownloadTarget, GenerationController, HistoryRecord,
    KeyValueStore, QrCodeRenderer,
};

use crate::render_queue::{Dispatch, Finished, JobKind, RenderQueue};
use crate::utils::texture::load_texture;
use crate::widgets::{FormState, HistoryAction, Thumbnail, Thumbnails};

pub type AppController =
    GenerationController<QrCodeRenderer, Box<dyn KeyValueStore>, Box<dyn DownloadSink>>;

/// The application state: the controller plus everything the UI caches
/// between frames.
pub struct State {
    pub controller: AppController,
    pub form: FormState,
    pub queue: RenderQueue,
    /// The uploaded preview, tagged with the preview revision it shows.
    preview_texture: Option<(u64, TextureHandle)>,
    pub thumbnails: Thumbnails,
    /// Set by "Regenerate" so the page scrolls back up to the form.
    pub scroll_to_top: bool,
}

impl State {
    pub fn new(
        config: BusinessConfig,
        store: Box<dyn KeyValueStore>,
        downloads: Box<dyn DownloadSink>,
        dispatch: Dispatch,
    ) -> Self {
        let renderer = QrCodeRenderer::new();
        Self {
            controller: GenerationController::new(config, renderer, store, downloads),
            form: FormState::default(),
            queue: RenderQueue::new(renderer, dispatch),
            preview_texture: None,
            thumbnails: Thumbnails::new(),
            scroll_to_top: false,
        }
    }

    /// History in the data directory, downloads into the download directory.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn native(config: BusinessConfig) -> Self {
        let store = qrgenie_business::FileStore::new(config.data_dir.clone());
        let downloads = qrgenie_business::DirectorySink::new(config.download_dir.clone());
        log::info!(
            "history in {}, downloads to {}",
            store.dir().display(),
            downloads.dir().display()
        );
        Self::new(config, Box::new(store), Box::new(downloads), Dispatch::Background)
    }

    /// History in `localStorage`, downloads through the browser.
    #[cfg(target_arch = "wasm32")]
    pub fn web(config: BusinessConfig) -> Self {
        let store: Box<dyn KeyValueStore> = match qrgenie_business::LocalStorage::new() {
            Ok(storage) => Box::new(storage),
            Err(err) => {
                log::warn!("localStorage unavailable, history is kept in memory: {err}");
                Box::new(qrgenie_business::MemoryStore::new())
            }
        };
        Self::new(
            config,
            store,
            Box::new(qrgenie_business::BrowserDownload),
            Dispatch::Background,
        )
    }

    /// Renders inline so a test harness sees results on the next frame.
    pub fn test(
        store: impl KeyValueStore + 'static,
        downloads: impl DownloadSink + 'static,
    ) -> Self {
        Self::new(
            BusinessConfig::default(),
            Box::new(store),
            Box::new(downloads),
            Dispatch::Inline,
        )
    }

    /// Starts generating from the current form values.
    pub fn submit_form(&mut self, ctx: &egui::Context) {
        match self.controller.begin(self.form.to_request()) {
            Ok(job) => self.queue.dispatch(JobKind::Submit, job, ctx),
            Err(err) => log::debug!("submission rejected: {err}"),
        }
    }

    pub fn regenerate(&mut self, record: &HistoryRecord) {
        self.form.reset_from(&record.request);
        if self.controller.regenerate(record).is_ok() {
            self.scroll_to_top = true;
        }
    }

    pub fn handle_history_action(&mut self, action: HistoryAction) {
        match action {
            HistoryAction::Regenerate(record) => self.regenerate(&record),
            HistoryAction::Download(record) => {
                self.controller.download(DownloadTarget::Record(&record));
            }
            HistoryAction::Clear => self.controller.clear_history(),
        }
    }

    /// Applies finished renders and refreshes cached textures. Call once per frame.
    pub fn poll(&mut self, ctx: &egui::Context) {
        for finished in self.queue.drain() {
            self.apply(ctx, finished);
        }
        self.sync_preview_texture(ctx);
        self.prune_thumbnails();
    }

    fn apply(&mut self, ctx: &egui::Context, finished: Finished) {
        let Finished { kind, job, outcome } = finished;
        match kind {
            JobKind::Submit => {
                if let Err(err) = self.controller.complete(job, outcome) {
                    log::debug!("submission finished with error: {err}");
                }
            }
            JobKind::Thumbnail(fingerprint) => {
                let thumbnail = match outcome {
                    Ok(image) => Thumbnail::Ready(load_texture(
                        ctx,
                        format!("history_thumbnail_{fingerprint}"),
                        &image,
                    )),
                    Err(err) => {
                        log::debug!("thumbnail render failed: {err}");
                        Thumbnail::Failed
                    }
                };
                self.thumbnails.insert(fingerprint, thumbnail);
            }
        }
    }

    fn sync_preview_texture(&mut self, ctx: &egui::Context) {
        let revision = self.controller.preview_revision();
        if self
            .preview_texture
            .as_ref()
            .is_some_and(|(shown, _)| *shown == revision)
        {
            return;
        }
        self.preview_texture = self
            .controller
            .preview()
            .map(|preview| (revision, load_texture(ctx, "qr_preview", &preview.image)));
    }

    fn prune_thumbnails(&mut self) {
        let history = self.controller.history();
        self.thumbnails.retain(|fingerprint, _| {
            history
                .iter()
                .any(|record| record.fingerprint() == *fingerprint)
        });
    }

    /// Queues a thumbnail render for every history record that has none yet.
    pub fn request_thumbnails(&mut self, ctx: &egui::Context) {
        let mut jobs = Vec::new();
        for record in self.controller.history() {
            let fingerprint = record.fingerprint();
            if self.thumbnails.contains_key(&fingerprint) {
                continue;
            }
            match self.controller.thumbnail_job(record) {
                Ok(job) => jobs.push((fingerprint, job)),
                Err(err) => {
                    log::debug!("no thumbnail for history record: {err}");
                    self.thumbnails.insert(fingerprint, Thumbnail::Failed);
                }
            }
        }

        for (fingerprint, job) in jobs {
            self.thumbnails.insert(fingerprint, Thumbnail::Pending);
            self.queue.dispatch(JobKind::Thumbnail(fingerprint), job, ctx);
        }
    }

    pub fn preview_texture(&self) -> Option<&TextureHandle> {
        self.preview_texture.as_ref().map(|(_, texture)| texture)
    }
}

#[cfg(test)]
mod tests {
    use qrgenie_business::{GenerationRequest, HISTORY_KEY, MemorySink, MemoryStore, QrSize};

    use super::*;

    fn state() -> (State, MemorySink) {
        let sink = MemorySink::new();
        (State::test(MemoryStore::new(), sink.clone()), sink)
    }

    #[test]
    fn submit_then_poll_updates_preview_and_history() {
        let ctx = egui::Context::default();
        let (mut state, _) = state();
        state.form.text = "https://example.com".to_owned();

        state.submit_form(&ctx);
        assert!(state.controller.is_busy());
        state.poll(&ctx);

        assert!(!state.controller.is_busy());
        assert_eq!(state.controller.history().len(), 1);
        assert!(state.preview_texture().is_some());
    }

    #[test]
    fn empty_form_is_rejected_without_queueing() {
        let ctx = egui::Context::default();
        let (mut state, _) = state();

        state.submit_form(&ctx);

        assert!(!state.queue.has_pending());
        assert!(!state.controller.validation_errors().is_empty());
    }

    #[test]
    fn regenerate_resets_form_and_scrolls_up() {
        let ctx = egui::Context::default();
        let (mut state, _) = state();
        let record = HistoryRecord::now(GenerationRequest::new("old", QrSize::Large, "#00FF00"));

        state.handle_history_action(HistoryAction::Regenerate(record));
        state.poll(&ctx);

        assert_eq!(state.form.text, "old");
        assert_eq!(state.form.size, QrSize::Large);
        assert!(state.scroll_to_top);
        assert!(state.controller.history().is_empty());
        assert_eq!(state.preview_texture().map(|t| t.size()), Some([350, 350]));
    }

    #[test]
    fn thumbnails_follow_the_history() {
        let ctx = egui::Context::default();
        let (mut state, _) = state();
        state.form.text = "thumb".to_owned();
        state.submit_form(&ctx);
        state.poll(&ctx);

        state.request_thumbnails(&ctx);
        state.poll(&ctx);
        let fingerprint = state.controller.history().get(0).unwrap().fingerprint();
        assert!(matches!(
            state.thumbnails.get(&fingerprint),
            Some(Thumbnail::Ready(_))
        ));

        state.handle_history_action(HistoryAction::Clear);
        state.poll(&ctx);
        assert!(state.thumbnails.is_empty());
        assert_eq!(
            state
                .controller
                .store()
                .backend()
                .get(HISTORY_KEY)
                .unwrap()
                .as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn history_download_goes_to_the_sink() {
        let ctx = egui::Context::default();
        let (mut state, sink) = state();
        state.form.text = "save me".to_owned();
        state.submit_form(&ctx);
        state.poll(&ctx);

        let record = state.controller.history().get(0).unwrap().clone();
        state.handle_history_action(HistoryAction::Download(record));

        assert_eq!(sink.len(), 1);
    }
}
