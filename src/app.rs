use std::collections::VecDeque;
use std::time::Duration;

use eframe::egui;

use crate::backend::SharedBackend;
use crate::state::{
    GameLifecycle, Installation, Notification, ReadinessProbe, Route, SettingsState, SetupForm,
    StateEvent,
};
use crate::ui::{self, Theme};

/// How often to poll backend events while something is in flight
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Main application state
pub struct SbrwApp {
    /// Backend all screens talk to
    pub backend: SharedBackend,
    pub theme: Theme,
    theme_dirty: bool,
    /// Screen requested by the user or by a notification
    pub route: Route,
    /// Screen whose machines are currently active
    mounted: Option<Route>,
    /// Status message for the status bar
    pub status_message: String,
    /// Notifications waiting to be acknowledged, oldest first
    notifications: VecDeque<Notification>,

    // Home
    pub readiness: ReadinessProbe,
    pub game: GameLifecycle,

    // Setup wizard
    pub setup_form: SetupForm,
    /// Present once the options page has been submitted
    pub installation: Option<Installation>,

    // Settings
    pub settings: SettingsState,
}

impl SbrwApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, backend: SharedBackend) -> Self {
        Self {
            backend,
            theme: Theme::default(),
            theme_dirty: true,
            route: Route::default(),
            mounted: None,
            status_message: "Ready".to_string(),
            notifications: VecDeque::new(),
            readiness: ReadinessProbe::default(),
            game: GameLifecycle::default(),
            setup_form: SetupForm::default(),
            installation: None,
            settings: SettingsState::default(),
        }
    }

    /// Navigate to another screen; takes effect at the start of the next frame
    pub fn navigate(&mut self, route: Route) {
        if self.route != route {
            tracing::debug!("Navigating {:?} -> {:?}", self.route, route);
            self.route = route;
        }
    }

    /// Submit the wizard's options page and start following the installation
    pub fn start_installation(&mut self) {
        let Some(options) = self.setup_form.options() else {
            self.status_message = "Choose a target directory first".to_string();
            return;
        };
        let mut installation = Installation::new(options);
        installation.activate(&self.backend);
        self.installation = Some(installation);
    }

    /// Mount the requested screen if it changed since last frame
    fn sync_route(&mut self) {
        if self.mounted == Some(self.route) {
            return;
        }
        if let Some(previous) = self.mounted.take() {
            self.unmount(previous);
        }
        self.mount(self.route);
        self.mounted = Some(self.route);
    }

    fn mount(&mut self, route: Route) {
        match route {
            Route::Home => {
                self.readiness.activate(&self.backend);
                self.game.activate(&self.backend);
            }
            Route::SetupWizard => {
                self.setup_form = SetupForm::default();
                self.installation = None;
            }
            Route::Settings => self.settings.load(&self.backend),
        }
    }

    fn unmount(&mut self, route: Route) {
        match route {
            Route::Home => {
                self.readiness.deactivate();
                self.game.deactivate();
            }
            Route::SetupWizard => {
                if let Some(mut installation) = self.installation.take() {
                    installation.deactivate();
                }
            }
            Route::Settings => {}
        }
    }

    /// Poll every machine of the mounted screen and apply what they report
    fn poll_tasks(&mut self) {
        let mut events = Vec::new();

        match self.mounted {
            Some(Route::Home) => {
                events.extend(self.readiness.poll());
                events.extend(self.game.poll());
            }
            Some(Route::SetupWizard) => {
                if let Some(installation) = self.installation.as_mut() {
                    events.extend(installation.poll(&self.backend));
                }
            }
            Some(Route::Settings) => events.extend(self.settings.poll(&self.backend)),
            None => {}
        }

        for event in events {
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: StateEvent) {
        match event {
            StateEvent::StatusMessage(msg) => self.status_message = msg,
            StateEvent::LogError(msg) => {
                tracing::error!("{}", msg);
                self.status_message = msg;
            }
            StateEvent::LogInfo(msg) => tracing::info!("{}", msg),
            StateEvent::Notify(notification) => self.notifications.push_back(notification),
        }
    }

    /// Whether anything is waiting on the backend
    fn is_busy(&self) -> bool {
        match self.mounted {
            Some(Route::Home) => true,
            Some(Route::SetupWizard) => self
                .installation
                .as_ref()
                .is_some_and(|i| !i.progress().is_finished()),
            Some(Route::Settings) => self.settings.is_busy(),
            None => false,
        }
    }
}

impl eframe::App for SbrwApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.theme_dirty {
            self.theme.apply(ctx);
            self.theme_dirty = false;
        }

        self.sync_route();
        self.poll_tasks();

        egui::TopBottomPanel::top("nav_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let theme = self.theme.clone();
                for (route, label) in [
                    (Route::Home, "Home"),
                    (Route::SetupWizard, "Setup"),
                    (Route::Settings, "Settings"),
                ] {
                    if ui::nav_button(ui, &theme, self.route == route, label) {
                        self.navigate(route);
                    }
                }
            });
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.status_message);
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| match self.route {
            Route::Home => ui::render_home(self, ui),
            Route::SetupWizard => ui::render_wizard(self, ui),
            Route::Settings => ui::render_settings(self, ui),
        });

        if let Some(notification) = self.notifications.front() {
            if let Some(then) = ui::notification_modal(ctx, &self.theme, notification) {
                self.notifications.pop_front();
                if let Some(route) = then {
                    self.navigate(route);
                }
            }
        }

        if self.is_busy() || self.mounted != Some(self.route) {
            ctx.request_repaint_after(POLL_INTERVAL);
        }
    }
}
