use egui::{Align2, Context, Frame, Id, RichText};
use qrgenie_business::{Notification, NotificationKind};

use crate::utils::colors::{COLOR_AMBER, COLOR_RED};

const TOAST_WIDTH: f32 = 320.0;

/// Stacks notifications in the bottom-right corner.
///
/// Returns the ids whose "Dismiss" button was clicked.
pub fn toasts(ctx: &Context, notifications: &[Notification]) -> Vec<u64> {
    let mut dismissed = Vec::new();
    if notifications.is_empty() {
        return dismissed;
    }

    egui::Area::new(Id::new("toasts"))
        .anchor(Align2::RIGHT_BOTTOM, [-12.0, -12.0])
        .show(ctx, |ui| {
            ui.set_max_width(TOAST_WIDTH);
            for notification in notifications {
                ui.push_id(notification.id, |ui| {
                    if toast(ui, notification) {
                        dismissed.push(notification.id);
                    }
                });
                ui.add_space(6.0);
            }
        });

    dismissed
}

fn toast(ui: &mut egui::Ui, notification: &Notification) -> bool {
    let accent = match notification.kind {
        NotificationKind::Error => COLOR_RED,
        NotificationKind::Info => COLOR_AMBER,
    };

    Frame::popup(ui.style())
        .stroke((1.0, accent))
        .show(ui, |ui| {
            ui.set_width(TOAST_WIDTH);
            ui.label(RichText::new(&notification.title).strong().color(accent));
            ui.label(&notification.description);
            ui.button("Dismiss").clicked()
        })
        .inner
}
