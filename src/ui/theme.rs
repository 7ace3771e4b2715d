//! Theme and styling configuration.
//!
//! The active theme is a process-wide value set once at startup with
//! [`init_theme`]. Views read it through [`theme`].

use std::sync::OnceLock;

use ratatui::style::{Color, Modifier, Style};

static THEME: OnceLock<Theme> = OnceLock::new();

/// Color theme for the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Primary foreground color.
    pub fg: Color,
    /// Titles, active tabs and key hints.
    pub accent: Color,
    /// Secondary text.
    pub dim: Color,
    /// Inactive borders.
    pub border: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    /// Background of the focused row.
    pub highlight_bg: Color,
}

impl Theme {
    /// The default dark theme.
    pub fn dark() -> Self {
        Self {
            fg: Color::White,
            accent: Color::Cyan,
            dim: Color::DarkGray,
            border: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            highlight_bg: Color::DarkGray,
        }
    }

    /// Bold accent text.
    pub fn title(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.dim)
    }

    /// Style for a money amount: red when negative.
    pub fn amount(&self, cents: i64) -> Style {
        if cents < 0 {
            Style::default().fg(self.error)
        } else {
            Style::default().fg(self.success)
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

/// Set the process-wide theme. Later calls are ignored.
pub fn init_theme(theme: Theme) {
    let _ = THEME.set(theme);
}

/// The active theme, falling back to [`Theme::dark`].
pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::dark)
}
