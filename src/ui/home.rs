//! Home screen: installation readiness and the launch/stop button

use eframe::egui::{self, RichText, Vec2};

use crate::app::SbrwApp;
use crate::state::{GameState, ReadinessState, Route};
use crate::ui::section_frame;

/// Render the home screen
pub fn render_home(app: &mut SbrwApp, ui: &mut egui::Ui) {
    let theme = app.theme.clone();

    ui.vertical_centered(|ui| {
        ui.add_space(24.0);
        ui.label(
            RichText::new("SoapBox Race World")
                .size(26.0)
                .strong()
                .color(theme.accent),
        );
        ui.label(RichText::new("Need for Speed: World, on Linux").color(theme.text_muted));
        ui.add_space(24.0);
    });

    section_frame(ui, &theme, "Game", |ui| match app.readiness.state() {
        ReadinessState::Loading => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(RichText::new("Checking installation...").color(theme.text_secondary));
            });
        }
        ReadinessState::Broken => {
            ui.label(
                RichText::new("The game is not installed, or the installation is incomplete.")
                    .color(theme.text_secondary),
            );
            ui.add_space(8.0);
            if ui.link("Start Setup").clicked() {
                app.navigate(Route::SetupWizard);
            }
        }
        ReadinessState::Ready => {
            let (status, color) = match app.game.state() {
                GameState::Stopped => ("Not running", theme.text_muted),
                GameState::Launching => ("Starting...", theme.accent),
                GameState::Running => ("Running", theme.success),
            };
            ui.horizontal(|ui| {
                ui.label(RichText::new("Status:").color(theme.text_muted));
                ui.label(RichText::new(status).color(color));
            });
            ui.add_space(12.0);

            let action = app.game.button();
            let button = egui::Button::new(RichText::new(action.label).size(16.0).strong())
                .min_size(Vec2::new(160.0, 40.0))
                .corner_radius(6.0);
            ui.horizontal(|ui| {
                if ui.add_enabled(action.enabled, button).clicked() {
                    app.game.toggle(&app.backend);
                }
                if app.game.command_in_flight() {
                    ui.spinner();
                }
            });
        }
    });
}
