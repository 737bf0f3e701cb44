//! The only page: form and preview side by side, history underneath.

use egui::{Response, ScrollArea, Ui};

use crate::{state::State, widgets};

/// Below this width the form and the preview stack vertically.
const TWO_COLUMN_MIN_WIDTH: f32 = 720.0;

pub fn home_page(state: &mut State, ui: &mut Ui) -> Response {
    let mut scroll = ScrollArea::vertical().auto_shrink([false, false]);
    if std::mem::take(&mut state.scroll_to_top) {
        scroll = scroll.vertical_scroll_offset(0.0);
    }

    ui.vertical(|ui| {
        scroll.show(ui, |ui| {
            if ui.available_width() >= TWO_COLUMN_MIN_WIDTH {
                ui.columns(2, |columns| {
                    form_section(state, &mut columns[0]);
                    preview_section(state, &mut columns[1]);
                });
            } else {
                form_section(state, ui);
                ui.separator();
                preview_section(state, ui);
            }

            ui.separator();
            history_section(state, ui);
        });
    })
    .response
}

fn form_section(state: &mut State, ui: &mut Ui) {
    let busy = state.controller.is_busy();
    let submitted = widgets::generate_form(
        ui,
        &mut state.form,
        state.controller.validation_errors(),
        busy,
    );
    if submitted {
        state.submit_form(ui.ctx());
    }
}

fn preview_section(state: &mut State, ui: &mut Ui) {
    if widgets::preview_card(ui, state.preview_texture()) {
        state
            .controller
            .download(qrgenie_business::DownloadTarget::Preview);
    }
}

fn history_section(state: &mut State, ui: &mut Ui) {
    state.request_thumbnails(ui.ctx());
    if let Some(action) = widgets::history_list(ui, state.controller.history(), &state.thumbnails)
    {
        state.handle_history_action(action);
    }
}
