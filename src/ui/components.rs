//! Shared UI components

use eframe::egui::{self, RichText};

use crate::state::{NoticeKind, Notification, Route};
use crate::ui::theme::Theme;

/// Render a navigation button for the top bar; returns true when clicked
pub fn nav_button(ui: &mut egui::Ui, theme: &Theme, active: bool, label: &str) -> bool {
    let color = if active { theme.accent } else { theme.text_secondary };
    ui.selectable_label(active, RichText::new(label).color(color))
        .clicked()
}

/// Bordered section with a title, used by every screen
pub fn section_frame<R>(
    ui: &mut egui::Ui,
    theme: &Theme,
    title: &str,
    content: impl FnOnce(&mut egui::Ui) -> R,
) -> R {
    egui::Frame::new()
        .fill(theme.bg_medium)
        .corner_radius(8.0)
        .inner_margin(16.0)
        .stroke(egui::Stroke::new(1.0, theme.border))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new(title).color(theme.accent).size(13.0).strong());
            ui.add_space(12.0);
            content(ui)
        })
        .inner
}

/// Render the notification modal.
///
/// Returns the route to navigate to once the user acknowledges it:
/// `Some(Some(route))` for a queued navigation, `Some(None)` for a plain dismissal.
pub fn notification_modal(
    ctx: &egui::Context,
    theme: &Theme,
    notification: &Notification,
) -> Option<Option<Route>> {
    let (title, color) = match notification.kind {
        NoticeKind::Info => ("Done", theme.success),
        NoticeKind::Error => ("Error", theme.error),
    };

    let mut acknowledged = false;
    egui::Modal::new(egui::Id::new("notification")).show(ctx, |ui| {
        ui.set_width(320.0);
        ui.vertical_centered(|ui| {
            ui.label(RichText::new(title).color(color).size(18.0).strong());
            ui.add_space(8.0);
            ui.label(RichText::new(&notification.message).color(theme.text_primary));
            ui.add_space(12.0);
            if ui.button("OK").clicked() {
                acknowledged = true;
            }
        });
    });

    acknowledged.then_some(notification.then)
}
