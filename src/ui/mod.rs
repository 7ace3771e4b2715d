//! User interface components and views.
//!
//! Views hold per-screen state and turn keys into actions; components are
//! the dialogs, inputs and toasts they share.

mod components;
pub mod theme;
mod views;

pub use components::{
    render_hints, ConfirmAction, ConfirmDialog, ErrorDialog, NotificationManager,
};
pub use theme::init_theme;
pub use views::{
    DetailAction, FormKind, FormRequest, HelpAction, HelpView, PropertiesAction, PropertiesView,
    PropertyDetailView, ReconcileAction, ReconcileView,
};
