//! UI-related application state

use std::path::PathBuf;

use crate::backend::SetupOptions;

/// Screens the app can navigate between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    /// Readiness check and the launch/stop button
    #[default]
    Home,
    /// Options form followed by the installation progress view
    SetupWizard,
    /// Wine, DXVK and game settings
    Settings,
}

/// Severity of a modal notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// One-shot modal that must be acknowledged before `then` is followed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NoticeKind,
    pub message: String,
    /// Navigation performed after the user presses OK
    pub then: Option<Route>,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
            then: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
            then: None,
        }
    }

    pub fn then(mut self, route: Route) -> Self {
        self.then = Some(route);
        self
    }
}

/// Fields on the wizard's options page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupForm {
    pub wine_prefix: String,
    pub desktop_shortcut: bool,
    pub menu_shortcut: bool,
}

impl Default for SetupForm {
    fn default() -> Self {
        Self {
            wine_prefix: default_wine_prefix().to_string_lossy().to_string(),
            desktop_shortcut: false,
            menu_shortcut: false,
        }
    }
}

impl SetupForm {
    /// Options for `start_setup`, or `None` while the target directory is blank
    pub fn options(&self) -> Option<SetupOptions> {
        let prefix = self.wine_prefix.trim();
        if prefix.is_empty() {
            return None;
        }
        Some(SetupOptions {
            wine_prefix: PathBuf::from(prefix),
            desktop_shortcut: self.desktop_shortcut,
            menu_shortcut: self.menu_shortcut,
        })
    }
}

/// `~/Games/need-for-speed-world`
pub fn default_wine_prefix() -> PathBuf {
    let games = directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join("Games"))
        .unwrap_or_else(|| PathBuf::from("Games"));
    games.join("need-for-speed-world")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_builders() {
        let note = Notification::error("boom").then(Route::Home);
        assert_eq!(note.kind, NoticeKind::Error);
        assert_eq!(note.message, "boom");
        assert_eq!(note.then, Some(Route::Home));
        assert_eq!(Notification::info("ok").then, None);
    }

    #[test]
    fn test_form_defaults_to_games_folder() {
        let form = SetupForm::default();
        assert!(form.wine_prefix.ends_with("need-for-speed-world"));
        let options = form.options().unwrap();
        assert!(options.wine_prefix.ends_with("Games/need-for-speed-world"));
        assert!(!options.desktop_shortcut);
    }

    #[test]
    fn test_blank_prefix_has_no_options() {
        let form = SetupForm {
            wine_prefix: "   ".to_string(),
            ..SetupForm::default()
        };
        assert!(form.options().is_none());
    }
}
