//! Setup wizard: options page, then installation progress

use eframe::egui::{self, RichText};

use crate::app::SbrwApp;
use crate::state::WizardOutcome;
use crate::ui::section_frame;

/// Render the setup wizard
pub fn render_wizard(app: &mut SbrwApp, ui: &mut egui::Ui) {
    if app.installation.is_some() {
        render_installation(app, ui);
    } else {
        render_options(app, ui);
    }
}

fn render_options(app: &mut SbrwApp, ui: &mut egui::Ui) {
    let theme = app.theme.clone();

    section_frame(ui, &theme, "Setup options", |ui| {
        ui.label(RichText::new("Install location").color(theme.text_muted));
        ui.horizontal(|ui| {
            let width = ui.available_width() - 90.0;
            ui.add(
                egui::TextEdit::singleline(&mut app.setup_form.wine_prefix).desired_width(width),
            );
            if ui.button("Browse...").clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .set_title("Select install location")
                    .pick_folder()
                {
                    app.setup_form.wine_prefix = path.to_string_lossy().to_string();
                }
            }
        });

        ui.add_space(12.0);
        ui.checkbox(&mut app.setup_form.desktop_shortcut, "Create desktop shortcut");
        ui.checkbox(
            &mut app.setup_form.menu_shortcut,
            "Create application menu shortcut",
        );

        ui.add_space(16.0);
        let can_start = app.setup_form.options().is_some();
        if ui
            .add_enabled(can_start, egui::Button::new("Install"))
            .clicked()
        {
            app.start_installation();
        }
    });
}

fn render_installation(app: &mut SbrwApp, ui: &mut egui::Ui) {
    let theme = app.theme.clone();
    let Some(installation) = app.installation.as_ref() else {
        return;
    };
    let progress = installation.progress();

    let color = match progress.outcome() {
        Some(WizardOutcome::Succeeded) => theme.success,
        Some(WizardOutcome::Failed) => theme.error,
        None => theme.accent,
    };

    section_frame(ui, &theme, "Installing", |ui| {
        ui.label(RichText::new(progress.label()).color(color).size(14.0).strong());
        ui.add_space(8.0);
        ui.add(egui::ProgressBar::new(progress.fraction()).show_percentage());
        ui.add_space(4.0);
        ui.label(
            RichText::new(format!(
                "Installing into {}",
                installation.session().options().wine_prefix.display()
            ))
            .color(theme.text_muted)
            .size(11.0),
        );
    });
}
