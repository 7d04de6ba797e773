use eframe::egui::{self, Color32, Stroke, Visuals};

/// Color palette for the utility
#[derive(Debug, Clone)]
pub struct Theme {
    pub bg_darkest: Color32,
    pub bg_dark: Color32,
    pub bg_medium: Color32,
    pub bg_light: Color32,

    pub text_primary: Color32,
    pub text_secondary: Color32,
    pub text_muted: Color32,

    pub accent: Color32,
    pub accent_hover: Color32,
    pub accent_muted: Color32,

    pub success: Color32,
    pub error: Color32,

    pub border: Color32,
}

impl Default for Theme {
    /// Dark background with the SBRW orange accent
    fn default() -> Self {
        Self {
            bg_darkest: Color32::from_rgb(14, 14, 16),
            bg_dark: Color32::from_rgb(22, 22, 26),
            bg_medium: Color32::from_rgb(32, 32, 38),
            bg_light: Color32::from_rgb(48, 48, 56),

            text_primary: Color32::from_rgb(245, 245, 245),
            text_secondary: Color32::from_rgb(200, 200, 205),
            text_muted: Color32::from_rgb(135, 135, 145),

            accent: Color32::from_rgb(249, 115, 22),
            accent_hover: Color32::from_rgb(251, 146, 60),
            accent_muted: Color32::from_rgb(194, 65, 12),

            success: Color32::from_rgb(34, 197, 94),
            error: Color32::from_rgb(239, 68, 68),

            border: Color32::from_rgb(63, 63, 70),
        }
    }
}

impl Theme {
    /// Apply this theme to egui's visuals
    pub fn apply(&self, ctx: &egui::Context) {
        let mut visuals = Visuals::dark();

        visuals.window_fill = self.bg_dark;
        visuals.panel_fill = self.bg_dark;
        visuals.faint_bg_color = self.bg_medium;
        visuals.extreme_bg_color = self.bg_darkest;

        let widgets = &mut visuals.widgets;
        widgets.noninteractive.bg_fill = self.bg_medium;
        widgets.noninteractive.bg_stroke = Stroke::new(1.0, self.border);
        widgets.noninteractive.fg_stroke = Stroke::new(1.0, self.text_secondary);

        widgets.inactive.bg_fill = self.bg_medium;
        widgets.inactive.weak_bg_fill = self.bg_light;
        widgets.inactive.fg_stroke = Stroke::new(1.0, self.text_primary);

        widgets.hovered.weak_bg_fill = self.bg_light;
        widgets.hovered.bg_stroke = Stroke::new(1.0, self.accent);

        widgets.active.bg_fill = self.accent_muted;
        widgets.active.weak_bg_fill = self.accent_muted;
        widgets.active.bg_stroke = Stroke::new(1.0, self.accent_hover);

        visuals.selection.bg_fill = self.accent.gamma_multiply(0.3);
        visuals.selection.stroke = Stroke::new(1.0, self.accent);
        visuals.hyperlink_color = self.accent;

        visuals.window_stroke = Stroke::new(1.0, self.border);
        visuals.window_shadow = egui::epaint::Shadow::NONE;
        visuals.popup_shadow = egui::epaint::Shadow::NONE;

        ctx.set_visuals(visuals);
    }
}
