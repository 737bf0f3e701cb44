//! The "Create Your QR Code" form.

use egui::{Button, ComboBox, Key, TextEdit, Ui};
use qrgenie_business::{Field, GenerationRequest, QrSize, ValidationErrors, parse_hex, to_hex};

use crate::utils::colors::{COLOR_RED, from_color32, to_color32};

/// Field values of the form, kept across frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub text: String,
    pub size: QrSize,
    pub fg_color: String,
}

impl Default for FormState {
    fn default() -> Self {
        let request = GenerationRequest::default();
        Self {
            text: request.text,
            size: request.size,
            fg_color: request.fg_color,
        }
    }
}

impl FormState {
    pub fn to_request(&self) -> GenerationRequest {
        GenerationRequest::new(self.text.clone(), self.size, self.fg_color.clone())
    }

    /// Loads a past request back into the fields.
    pub fn reset_from(&mut self, request: &GenerationRequest) {
        self.text.clone_from(&request.text);
        self.size = request.size;
        self.fg_color.clone_from(&request.fg_color);
    }
}

fn field_error(ui: &mut Ui, errors: &ValidationErrors, field: Field) {
    if let Some(message) = errors.get(field) {
        ui.colored_label(COLOR_RED, message);
    }
}

/// Renders the form. Returns `true` when the user asked to generate.
pub fn generate_form(
    ui: &mut Ui,
    form: &mut FormState,
    errors: &ValidationErrors,
    busy: bool,
) -> bool {
    let mut submitted = false;

    ui.heading("Create Your QR Code");
    ui.label("Enter your text or URL and customize the design.");
    ui.add_space(12.0);

    ui.label("URL or Text");
    let text = ui.add(
        TextEdit::singleline(&mut form.text)
            .hint_text("e.g., https://example.com")
            .desired_width(f32::INFINITY),
    );
    if text.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
        submitted = true;
    }
    field_error(ui, errors, Field::Text);
    ui.add_space(8.0);

    ui.horizontal_top(|ui| {
        ui.vertical(|ui| {
            ui.label("Size");
            size_select(ui, &mut form.size);
            field_error(ui, errors, Field::Size);
        });
        ui.add_space(24.0);
        ui.vertical(|ui| {
            ui.label("Foreground Color");
            color_input(ui, &mut form.fg_color);
            field_error(ui, errors, Field::FgColor);
        });
    });
    ui.add_space(12.0);

    let label = if busy {
        "Generating..."
    } else {
        "Generate QR Code"
    };
    let button = ui.add_enabled(
        !busy,
        Button::new(label).min_size(egui::vec2(ui.available_width(), 36.0)),
    );
    if button.clicked() {
        submitted = true;
    }

    submitted && !busy
}

fn size_select(ui: &mut Ui, size: &mut QrSize) {
    ComboBox::from_id_salt("qr_size")
        .selected_text(size.label())
        .show_ui(ui, |ui| {
            for option in QrSize::OPTIONS {
                ui.selectable_value(size, option, option.label());
            }
        });
}

/// Color picker next to a free-form hex field; both edit the same string.
fn color_input(ui: &mut Ui, fg_color: &mut String) {
    ui.horizontal(|ui| {
        let mut color = to_color32(parse_hex(fg_color).unwrap_or(qrgenie_business::WHITE));
        if egui::color_picker::color_edit_button_srgba(
            ui,
            &mut color,
            egui::color_picker::Alpha::Opaque,
        )
        .changed()
        {
            *fg_color = to_hex(from_color32(color));
        }
        ui.add(TextEdit::singleline(fg_color).desired_width(96.0));
    });
}

#[cfg(test)]
mod generate_form_test {
    use egui_kittest::Harness;
    use kittest::Queryable;

    use super::*;

    struct FormHarnessState {
        form: FormState,
        errors: ValidationErrors,
        busy: bool,
        submitted: usize,
    }

    fn harness(errors: ValidationErrors, busy: bool) -> Harness<'static, FormHarnessState> {
        Harness::new_ui_state(
            |ui, state: &mut FormHarnessState| {
                if generate_form(ui, &mut state.form, &state.errors, state.busy) {
                    state.submitted += 1;
                }
            },
            FormHarnessState {
                form: FormState::default(),
                errors,
                busy,
                submitted: 0,
            },
        )
    }

    #[test]
    fn form_defaults() {
        let form = FormState::default();
        assert!(form.text.is_empty());
        assert_eq!(form.size, QrSize::Medium);
        assert_eq!(form.fg_color, "#FFFFFF");
    }

    #[test]
    fn reset_from_copies_every_field() {
        let mut form = FormState::default();
        form.reset_from(&GenerationRequest::new("again", QrSize::Large, "#112233"));

        assert_eq!(
            form.to_request(),
            GenerationRequest::new("again", QrSize::Large, "#112233")
        );
    }

    #[test]
    fn shows_labels_and_submit_button() {
        let mut harness = harness(ValidationErrors::default(), false);
        harness.step();

        assert!(harness.query_by_label_contains("URL or Text").is_some());
        assert!(harness.query_by_label_contains("Size").is_some());
        assert!(harness.query_by_label_contains("Foreground Color").is_some());
        assert!(harness.query_by_label("Generate QR Code").is_some());
    }

    #[test]
    fn clicking_generate_submits() {
        let mut harness = harness(ValidationErrors::default(), false);
        harness.step();

        harness.get_by_label("Generate QR Code").click();
        harness.step();

        assert_eq!(harness.state().submitted, 1);
    }

    #[test]
    fn busy_form_shows_generating_and_does_not_submit() {
        let mut harness = harness(ValidationErrors::default(), true);
        harness.step();

        assert!(harness.query_by_label("Generate QR Code").is_none());
        harness.get_by_label("Generating...").click();
        harness.step();

        assert_eq!(harness.state().submitted, 0);
    }

    #[test]
    fn validation_message_is_shown_inline() {
        let mut errors = ValidationErrors::new();
        errors.add(Field::Text, qrgenie_business::TEXT_REQUIRED);
        let mut harness = harness(errors, false);
        harness.step();

        assert!(
            harness
                .query_by_label_contains("Please enter a valid URL or text.")
                .is_some()
        );
    }
}
