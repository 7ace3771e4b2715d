//! Key hint bar at the bottom of the screen.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::ui::theme::theme;

/// Render a line of hints such as `"[j/k] move  [Enter] open"`.
///
/// Bracketed keys are highlighted.
pub fn render_hints(frame: &mut Frame, area: Rect, hints: &str) {
    frame.render_widget(Paragraph::new(Line::from(hint_spans(hints))), area);
}

fn hint_spans(hints: &str) -> Vec<Span<'static>> {
    let t = theme();
    let key = Style::default().fg(t.accent);
    let text = t.muted();

    let mut spans = Vec::new();
    let mut rest = hints;
    while let Some(open) = rest.find('[') {
        let Some(close) = rest[open..].find(']').map(|i| open + i) else {
            break;
        };
        if open > 0 {
            spans.push(Span::styled(rest[..open].to_string(), text));
        }
        spans.push(Span::styled(rest[open..=close].to_string(), key));
        rest = &rest[close + 1..];
    }
    if !rest.is_empty() {
        spans.push(Span::styled(rest.to_string(), text));
    }
    spans
}
