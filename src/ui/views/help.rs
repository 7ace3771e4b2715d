//! Help panel listing keyboard shortcuts.
//!
//! Opened with `?`, closed with `?`, `q` or Esc. Scrolls with j/k.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::ui::theme::theme;

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Global",
        &[
            ("?", "Toggle this help"),
            ("R", "Stays to reconcile"),
            ("r", "Refresh"),
            ("Esc", "Go back"),
            ("q / Ctrl+C", "Quit"),
        ],
    ),
    (
        "Tables",
        &[
            ("j / k", "Move down / up"),
            ("h / l, ← / →", "Previous / next page"),
            ("1-9", "Jump to page"),
            ("Enter", "Open"),
        ],
    ),
    (
        "Property",
        &[
            ("Tab", "Next tab"),
            ("Space", "Select stay"),
            ("a", "Select all stays"),
            ("x", "Cancel selected stays"),
            ("c", "Copy stay details"),
            ("e", "Record expense"),
            ("i", "Record revenue"),
            ("n", "Rename property"),
            ("b", "Link booking platform calendar"),
            ("h / l", "Dashboard: previous / next year"),
        ],
    ),
    (
        "Forms",
        &[
            ("Tab / ↓", "Next field"),
            ("Shift+Tab / ↑", "Previous field"),
            ("Ctrl+G", "Generate entrance code"),
            ("Enter", "Submit"),
            ("Esc", "Close form"),
        ],
    ),
];

/// Actions returned from the help view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpAction {
    Close,
}

/// The help panel.
#[derive(Debug, Default)]
pub struct HelpView {
    scroll: usize,
    visible_height: usize,
}

impl HelpView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset_scroll(&mut self) {
        self.scroll = 0;
    }

    fn total_lines() -> usize {
        SECTIONS
            .iter()
            .map(|(_, bindings)| bindings.len() + 2)
            .sum::<usize>()
            + 1
    }

    fn max_scroll(&self) -> usize {
        Self::total_lines().saturating_sub(self.visible_height)
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Option<HelpAction> {
        match key.code {
            KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::Esc => Some(HelpAction::Close),
            KeyCode::Char('j') | KeyCode::Down => {
                self.scroll = (self.scroll + 1).min(self.max_scroll());
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll = self.scroll.saturating_sub(1);
                None
            }
            _ => None,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let t = theme();
        frame.render_widget(Clear, area);
        let block = Block::default()
            .title(" Help - Keyboard Shortcuts ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(t.accent));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        self.visible_height = inner.height as usize;
        self.scroll = self.scroll.min(self.max_scroll());

        frame.render_widget(
            Paragraph::new(content_lines()).scroll((self.scroll as u16, 0)),
            inner,
        );
    }
}

fn content_lines() -> Vec<Line<'static>> {
    let t = theme();
    let mut lines = Vec::with_capacity(HelpView::total_lines());
    for (section, bindings) in SECTIONS {
        lines.push(Line::styled(
            format!("── {} ──", section),
            Style::default().fg(t.warning).add_modifier(Modifier::BOLD),
        ));
        for (keys, description) in *bindings {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{:>16}", keys),
                    Style::default().fg(t.success).add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::raw(*description),
            ]));
        }
        lines.push(Line::raw(""));
    }
    lines.push(Line::styled("Press ?, q, or Esc to close", t.muted()));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_close_keys() {
        let mut view = HelpView::new();
        for code in [KeyCode::Char('?'), KeyCode::Char('q'), KeyCode::Esc] {
            assert_eq!(view.handle_input(key(code)), Some(HelpAction::Close));
        }
    }

    #[test]
    fn test_scroll_is_bounded() {
        let mut view = HelpView::new();
        view.visible_height = 5;
        for _ in 0..100 {
            view.handle_input(key(KeyCode::Char('j')));
        }
        assert_eq!(view.scroll, view.max_scroll());
        for _ in 0..100 {
            view.handle_input(key(KeyCode::Char('k')));
        }
        assert_eq!(view.scroll, 0);
    }

    #[test]
    fn test_content_line_count_matches() {
        assert_eq!(content_lines().len(), HelpView::total_lines());
    }
}
