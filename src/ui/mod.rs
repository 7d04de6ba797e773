//! UI modules for the SBRW utility
//!
//! Rendering only: every screen reads and drives the state machines owned by
//! [`crate::app::SbrwApp`].

mod components;
mod home;
mod settings;
mod theme;
mod wizard;

pub use components::{nav_button, notification_modal, section_frame};
pub use home::render_home;
pub use settings::render_settings;
pub use theme::Theme;
pub use wizard::render_wizard;
