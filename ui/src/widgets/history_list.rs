//! The "History" card: the last generated codes, newest first.
//!
//! Each row shows a thumbnail when its render is ready (a color swatch until
//! then), the text, the generation time and size, plus "Regenerate" and
//! "Download" actions.

use std::collections::BTreeMap;

use egui::{Button, Frame, Sense, TextureHandle, Ui, vec2};
use qrgenie_business::{HistoryList, HistoryRecord, MAX_HISTORY, display_timestamp, parse_hex};

use crate::utils::colors::{COLOR_MUTED, to_color32};

/// Edge of a row thumbnail, in points.
const THUMBNAIL_SIZE: f32 = 40.0;

/// Render state of one history thumbnail, keyed by record fingerprint.
#[derive(Clone)]
pub enum Thumbnail {
    Pending,
    Ready(TextureHandle),
    Failed,
}

pub type Thumbnails = BTreeMap<u64, Thumbnail>;

/// What the user asked for in the history card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryAction {
    Regenerate(HistoryRecord),
    Download(HistoryRecord),
    Clear,
}

pub fn history_list(
    ui: &mut Ui,
    history: &HistoryList,
    thumbnails: &Thumbnails,
) -> Option<HistoryAction> {
    let mut action = None;

    ui.horizontal(|ui| {
        ui.vertical(|ui| {
            ui.heading("History");
            ui.label(format!("Your last {MAX_HISTORY} generated codes."));
        });
        if !history.is_empty() {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Clear History").clicked() {
                    action = Some(HistoryAction::Clear);
                }
            });
        }
    });
    ui.add_space(8.0);

    if history.is_empty() {
        ui.vertical_centered(|ui| {
            ui.add_space(24.0);
            ui.weak("No history yet. Generate a QR code to see it here.");
            ui.add_space(24.0);
        });
        return action;
    }

    for (index, record) in history.iter().enumerate() {
        ui.push_id(index, |ui| {
            let thumbnail = thumbnails.get(&record.fingerprint());
            if let Some(row_action) = history_row(ui, record, thumbnail) {
                action = Some(row_action);
            }
        });
        ui.add_space(4.0);
    }

    action
}

fn history_row(
    ui: &mut Ui,
    record: &HistoryRecord,
    thumbnail: Option<&Thumbnail>,
) -> Option<HistoryAction> {
    let mut action = None;

    Frame::group(ui.style()).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            match thumbnail {
                Some(Thumbnail::Ready(texture)) => {
                    ui.add(
                        egui::Image::from_texture(texture)
                            .fit_to_exact_size(vec2(THUMBNAIL_SIZE, THUMBNAIL_SIZE)),
                    );
                }
                _ => swatch(ui, &record.request.fg_color),
            }

            ui.vertical(|ui| {
                let text = egui::RichText::new(&record.request.text).strong();
                ui.add(egui::Label::new(text).truncate());
                ui.weak(format!(
                    "{} • {}",
                    display_timestamp(&record.timestamp),
                    record.request.size
                ));
            });

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.add(Button::new("Download")).clicked() {
                    action = Some(HistoryAction::Download(record.clone()));
                }
                if ui.add(Button::new("Regenerate")).clicked() {
                    action = Some(HistoryAction::Regenerate(record.clone()));
                }
            });
        });
    });

    action
}

/// Foreground-color square shown while a thumbnail is pending or failed.
fn swatch(ui: &mut Ui, fg_color: &str) {
    let (rect, _) =
        ui.allocate_exact_size(vec2(THUMBNAIL_SIZE, THUMBNAIL_SIZE), Sense::hover());
    let fill = parse_hex(fg_color).map_or(COLOR_MUTED, to_color32);
    ui.painter().rect_filled(rect, 4.0, fill);
    ui.painter()
        .rect_stroke(rect, 4.0, (1.0, COLOR_MUTED), egui::StrokeKind::Inside);
}

#[cfg(test)]
mod history_list_test {
    use chrono::{TimeZone as _, Utc};
    use egui_kittest::Harness;
    use kittest::Queryable;
    use qrgenie_business::{GenerationRequest, QrSize};

    use super::*;

    struct HistoryHarnessState {
        history: HistoryList,
        actions: Vec<HistoryAction>,
    }

    fn record(text: &str, minute: u32) -> HistoryRecord {
        HistoryRecord::new(
            GenerationRequest::new(text, QrSize::Small, "#000000"),
            Utc.with_ymd_and_hms(2026, 10, 19, 9, minute, 0).unwrap(),
        )
    }

    fn harness(history: HistoryList) -> Harness<'static, HistoryHarnessState> {
        Harness::new_ui_state(
            |ui, state: &mut HistoryHarnessState| {
                if let Some(action) = history_list(ui, &state.history, &Thumbnails::new()) {
                    state.actions.push(action);
                }
            },
            HistoryHarnessState {
                history,
                actions: Vec::new(),
            },
        )
    }

    #[test]
    fn empty_history_shows_hint_and_no_clear_button() {
        let mut harness = harness(HistoryList::new());
        harness.step();

        assert!(harness.query_by_label("History").is_some());
        assert!(
            harness
                .query_by_label_contains("Your last 5 generated codes.")
                .is_some()
        );
        assert!(
            harness
                .query_by_label_contains("No history yet. Generate a QR code to see it here.")
                .is_some()
        );
        assert!(harness.query_by_label("Clear History").is_none());
    }

    #[test]
    fn rows_show_text_and_size() {
        let history = HistoryList::from_records([record("second", 2), record("first", 1)]);
        let mut harness = harness(history);
        harness.step();

        assert!(harness.query_by_label("second").is_some());
        assert!(harness.query_by_label("first").is_some());
        assert_eq!(harness.query_all_by_label_contains("• 150px").count(), 2);
        assert!(harness.query_by_label("Clear History").is_some());
    }

    #[test]
    fn regenerate_reports_the_clicked_record() {
        let history = HistoryList::from_records([record("only", 1)]);
        let mut harness = harness(history);
        harness.step();

        harness.get_by_label("Regenerate").click();
        harness.step();

        assert_eq!(
            harness.state().actions,
            vec![HistoryAction::Regenerate(record("only", 1))]
        );
    }

    #[test]
    fn clear_and_download_are_reported() {
        let history = HistoryList::from_records([record("only", 1)]);
        let mut harness = harness(history);
        harness.step();

        harness.get_by_label("Download").click();
        harness.step();
        harness.get_by_label("Clear History").click();
        harness.step();

        assert_eq!(
            harness.state().actions,
            vec![
                HistoryAction::Download(record("only", 1)),
                HistoryAction::Clear
            ]
        );
    }
}
