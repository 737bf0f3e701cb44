//! Shared color constants for the UI.

use egui::Color32;

/// Inline validation messages and error toasts.
pub const COLOR_RED: Color32 = Color32::from_rgb(220, 53, 69);

/// Informational toasts.
pub const COLOR_AMBER: Color32 = Color32::from_rgb(255, 193, 7);

/// Border of the empty preview placeholder.
pub const COLOR_MUTED: Color32 = Color32::from_gray(140);

/// Converts a straight RGBA color from the business layer.
pub fn to_color32(rgba: qrgenie_business::Rgba) -> Color32 {
    let [r, g, b, a] = rgba;
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

/// Inverse of [`to_color32`].
pub fn from_color32(color: Color32) -> qrgenie_business::Rgba {
    color.to_srgba_unmultiplied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_colors_round_trip() {
        let rgba = [18, 52, 86, 255];
        assert_eq!(from_color32(to_color32(rgba)), rgba);
    }
}
