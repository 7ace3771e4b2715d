//! Reusable UI components.

mod dialog;
mod help_bar;
mod input;
mod notification;

pub use dialog::{centered_rect, ConfirmAction, ConfirmDialog, ErrorDialog};
pub use help_bar::render_hints;
pub use input::TextInput;
pub use notification::NotificationManager;
