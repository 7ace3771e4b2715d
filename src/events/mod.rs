//! Event handling for the application.
//!
//! Terminal input is polled by [`EventHandler`] and converted into [`Event`]s
//! that drive `App::update`.

mod handler;

use crossterm::event::KeyEvent;

pub use handler::EventHandler;

/// An application event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A key press.
    Key(KeyEvent),
    /// The terminal was resized to (columns, rows).
    Resize(u16, u16),
    /// No input within the tick rate.
    Tick,
    /// The application should exit.
    Quit,
}
