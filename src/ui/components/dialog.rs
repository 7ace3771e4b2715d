//! Modal dialogs drawn over the current screen.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::error::AppError;
use crate::ui::theme::theme;

/// A rectangle of `percent_x` by `height` rows centered in `area`.
pub fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height.min(area.height)),
            Constraint::Fill(1),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// Blocking dialog for errors that need acknowledgment.
#[derive(Debug, Default)]
pub struct ErrorDialog {
    content: Option<(String, String, Option<&'static str>)>,
}

impl ErrorDialog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show an application error with its suggested action.
    pub fn show(&mut self, error: &AppError) {
        self.content = Some((
            "Error".to_string(),
            error.user_message(),
            error.suggested_action(),
        ));
    }

    pub fn show_message(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.content = Some((title.into(), message.into(), None));
    }

    pub fn dismiss(&mut self) {
        self.content = None;
    }

    pub fn is_visible(&self) -> bool {
        self.content.is_some()
    }

    pub fn message(&self) -> Option<&str> {
        self.content.as_ref().map(|(_, message, _)| message.as_str())
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let Some((title, message, hint)) = &self.content else {
            return;
        };
        let t = theme();
        let mut lines = vec![Line::raw(""), Line::raw(message.clone())];
        if let Some(hint) = hint {
            lines.push(Line::raw(""));
            lines.push(Line::styled(*hint, Style::default().fg(t.warning)));
        }
        lines.push(Line::raw(""));
        lines.push(Line::styled("Press Enter or Esc to dismiss", t.muted()));

        let dialog = centered_rect(60, lines.len() as u16 + 2, area);
        frame.render_widget(Clear, dialog);
        let block = Block::default()
            .title(Span::styled(
                format!(" {} ", title),
                Style::default().fg(t.error).add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(t.error));
        frame.render_widget(
            Paragraph::new(lines)
                .block(block)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            dialog,
        );
    }
}

/// Result of a key press in a [`ConfirmDialog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    Confirm,
    Cancel,
}

/// Yes/no dialog guarding a destructive action.
#[derive(Debug, Default)]
pub struct ConfirmDialog {
    content: Option<(String, String)>,
}

impl ConfirmDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.content = Some((title.into(), message.into()));
    }

    pub fn is_visible(&self) -> bool {
        self.content.is_some()
    }

    /// `y`/Enter confirms, `n`/Esc cancels. Either one closes the dialog.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<ConfirmAction> {
        let action = match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => ConfirmAction::Confirm,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => ConfirmAction::Cancel,
            _ => return None,
        };
        self.content = None;
        Some(action)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let Some((title, message)) = &self.content else {
            return;
        };
        let t = theme();
        let lines = vec![
            Line::raw(""),
            Line::raw(message.clone()),
            Line::raw(""),
            Line::from(vec![
                Span::styled("[y]", Style::default().fg(t.error).add_modifier(Modifier::BOLD)),
                Span::raw(" confirm   "),
                Span::styled("[n]", t.title()),
                Span::raw(" cancel"),
            ]),
        ];
        let dialog = centered_rect(50, lines.len() as u16 + 2, area);
        frame.render_widget(Clear, dialog);
        let block = Block::default()
            .title(Span::styled(format!(" {} ", title), t.title()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(t.warning));
        frame.render_widget(
            Paragraph::new(lines)
                .block(block)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            dialog,
        );
    }
}
