use crate::{pages, state::State, widgets};

#[derive(bon::Builder)]
pub struct QrGenieApp {
    pub state: State,
}

impl QrGenieApp {
    /// Called once before the first frame.
    pub fn new(state: State) -> Self {
        Self { state }
    }
}

impl eframe::App for QrGenieApp {
    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Results of background renders land here before anything is drawn.
        self.state.poll(ctx);

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.strong("QR Genie");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    egui::widgets::global_theme_preference_switch(ui);
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            pages::home_page(&mut self.state, ui);
        });

        for id in widgets::toasts(ctx, self.state.controller.notifications()) {
            self.state.controller.dismiss(id);
        }

        if self.state.queue.has_pending() {
            ctx.request_repaint();
        }
    }
}
