//! Settings screen rendering

use eframe::egui::{self, RichText};

use crate::app::SbrwApp;
use crate::config::RunnerVersion;
use crate::ui::{Theme, section_frame};

/// Render the settings screen
pub fn render_settings(app: &mut SbrwApp, ui: &mut egui::Ui) {
    let theme = app.theme.clone();

    ui.label(
        RichText::new("Settings")
            .color(theme.text_primary)
            .size(20.0)
            .strong(),
    );
    ui.add_space(12.0);

    if let Some(ref error) = app.settings.error {
        ui.colored_label(theme.error, error);
        ui.add_space(8.0);
    }

    let busy = app.settings.is_busy();
    let loading = app.settings.is_loading();
    let Some(document) = app.settings.document.as_mut() else {
        if loading {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading settings...");
            });
        }
        return;
    };

    let commands = document.available_commands.unwrap_or_default();
    let mut save_clicked = false;
    let mut add_wine_clicked = false;

    egui::ScrollArea::vertical()
        .id_salt("settings_scroll")
        .show(ui, |ui| {
            section_frame(ui, &theme, "Wine", |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new("Version:").color(theme.text_muted));
                    let versions = document.available_wine_versions.clone().unwrap_or_default();
                    version_combo(
                        ui,
                        "wine_version",
                        &versions,
                        &mut document.wine.version,
                        &mut document.wine.path,
                    );
                    if ui.button("Add Wine version...").clicked() {
                        add_wine_clicked = true;
                    }
                });
                ui.checkbox(&mut document.wine.esync, "Esync");
                ui.checkbox(&mut document.wine.fsync, "Fsync");
                wrapper_checkbox(
                    ui,
                    &mut document.wine.feral_gamemode,
                    commands.gamemoderun,
                    "Feral GameMode",
                    "gamemoderun",
                );
            });

            ui.add_space(12.0);

            section_frame(ui, &theme, "DXVK", |ui| {
                ui.checkbox(&mut document.dxvk.enabled, "Enable DXVK");
                ui.add_enabled_ui(document.dxvk.enabled, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new("Version:").color(theme.text_muted));
                        let versions = document.available_dxvk_versions.clone().unwrap_or_default();
                        version_combo(
                            ui,
                            "dxvk_version",
                            &versions,
                            &mut document.dxvk.version,
                            &mut document.dxvk.path,
                        );
                    });
                });
            });

            ui.add_space(12.0);

            section_frame(ui, &theme, "Game", |ui| {
                path_row(ui, &theme, "Prefix:", &document.game.prefix);
                path_row(ui, &theme, "Launcher:", &document.game.launcher);
                ui.add_space(4.0);
                wrapper_checkbox(
                    ui,
                    &mut document.game.mangohud,
                    commands.mangohud,
                    "Show MangoHud overlay",
                    "mangohud",
                );
            });

            ui.add_space(16.0);
            if ui.add_enabled(!busy, egui::Button::new("Save")).clicked() {
                save_clicked = true;
            }
        });

    if save_clicked {
        app.settings.save(&app.backend);
    }
    if add_wine_clicked {
        if let Some(path) = rfd::FileDialog::new()
            .set_title("Select an extracted Wine or Proton build")
            .pick_folder()
        {
            app.settings.add_runtime_version(&app.backend, path);
        }
    }
}

/// Pick one of the discovered versions, keeping version name and path in step
fn version_combo(
    ui: &mut egui::Ui,
    id: &str,
    versions: &[RunnerVersion],
    version: &mut String,
    path: &mut String,
) {
    let selected = if version.is_empty() {
        "Not selected".to_string()
    } else {
        version.clone()
    };

    egui::ComboBox::from_id_salt(id)
        .selected_text(selected)
        .show_ui(ui, |ui| {
            for candidate in versions {
                if ui
                    .selectable_label(*version == candidate.name, &candidate.name)
                    .clicked()
                {
                    *version = candidate.name.clone();
                    *path = candidate.path.clone();
                }
            }
        });
}

/// Toggle for a launch wrapper; shown off and disabled when it is not installed
fn wrapper_checkbox(
    ui: &mut egui::Ui,
    value: &mut bool,
    available: bool,
    label: &str,
    command: &str,
) {
    if available {
        ui.checkbox(value, label);
    } else {
        let mut off = false;
        ui.add_enabled(false, egui::Checkbox::new(&mut off, label))
            .on_disabled_hover_text(format!("{} was not found on PATH", command));
    }
}

fn path_row(ui: &mut egui::Ui, theme: &Theme, label: &str, value: &str) {
    ui.horizontal(|ui| {
        ui.label(RichText::new(label).color(theme.text_muted));
        let shown = if value.is_empty() { "Not set" } else { value };
        ui.label(RichText::new(shown).color(theme.text_primary));
    });
}
