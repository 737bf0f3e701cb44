use egui::{Button, Frame, Stroke, TextureHandle, Ui, vec2};

use crate::utils::colors::COLOR_MUTED;

/// Edge of the empty placeholder, matching the default QR size.
const PLACEHOLDER_SIZE: f32 = 250.0;

/// Shows the current QR code, or a placeholder before the first generation.
///
/// Returns `true` when "Download PNG" was clicked.
pub fn preview_card(ui: &mut Ui, texture: Option<&TextureHandle>) -> bool {
    ui.heading("Preview");
    ui.add_space(8.0);

    let Some(texture) = texture else {
        Frame::group(ui.style())
            .stroke(Stroke::new(1.0, COLOR_MUTED))
            .show(ui, |ui| {
                ui.set_min_size(vec2(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE));
                ui.centered_and_justified(|ui| {
                    ui.weak("Your QR code will appear here.");
                });
            });
        return false;
    };

    ui.vertical_centered(|ui| {
        ui.add(egui::Image::from_texture(texture).fit_to_original_size(1.0))
            .on_hover_text("Generated QR Code");
    });
    ui.add_space(8.0);

    ui.add(Button::new("Download PNG").min_size(vec2(ui.available_width(), 32.0)))
        .clicked()
}
