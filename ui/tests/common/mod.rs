use kittest::Queryable as _;
use egui_kittest::Harness;
use qrgenie_business::{MemorySink, MemoryStore};
use qrgenie_ui::QrGenieApp;
use qrgenie_ui::state::State;

pub struct TestCtx<'a> {
    harness: Harness<'a, QrGenieApp>,
    downloads: MemorySink,
}

impl<'a> TestCtx<'a> {
    pub fn new_app() -> Self {
        Self::with_store(MemoryStore::new())
    }

    pub fn with_store(store: MemoryStore) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let downloads = MemorySink::new();
        let state = State::test(store, downloads.clone());
        let app = QrGenieApp::builder().state(state).build();
        // Tall enough that the history card is on screen without scrolling.
        let harness = Harness::builder()
            .with_size(egui::vec2(1024.0, 1400.0))
            .build_eframe(|_| app);

        Self { harness, downloads }
    }

    pub fn harness_mut(&mut self) -> &mut Harness<'a, QrGenieApp> {
        &mut self.harness
    }

    #[allow(unused)]
    pub fn harness(&self) -> &Harness<'a, QrGenieApp> {
        &self.harness
    }

    #[allow(unused)]
    pub fn downloads(&self) -> &MemorySink {
        &self.downloads
    }

    pub fn state_mut(&mut self) -> &mut State {
        &mut self.harness.state_mut().state
    }

    pub fn state(&self) -> &State {
        &self.harness.state().state
    }

    /// Runs enough frames for a click to be handled and its render applied.
    pub fn settle(&mut self) {
        for _ in 0..3 {
            self.harness.step();
        }
    }

    /// Fills the form and clicks "Generate QR Code".
    #[allow(unused)]
    pub fn generate(&mut self, text: &str) {
        self.state_mut().form.text = text.to_owned();
        self.harness.step();
        self.harness.get_by_label("Generate QR Code").click();
        self.settle();
    }
}
