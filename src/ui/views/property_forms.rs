//! Forms opened from the property detail screen.
//!
//! Each form edits a few [`TextInput`]s and, on `Enter`, builds a validated
//! [`FormRequest`]. The form stays open while the request runs so a server
//! error can be shown in place.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::api::types::{
    ExternalBookingRequest, Platform, Property, RecordMovementRequest, UpdatePropertyRequest,
};
use crate::api::{MovementKind, ValidationError};
use crate::format::currency;
use crate::ui::components::{centered_rect, TextInput};
use crate::ui::theme::theme;

/// Which form is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Expense,
    Revenue,
    Rename,
    ExternalBooking,
}

impl FormKind {
    fn title(self) -> &'static str {
        match self {
            FormKind::Expense => " Record expense ",
            FormKind::Revenue => " Record revenue ",
            FormKind::Rename => " Edit property ",
            FormKind::ExternalBooking => " Link booking platform ",
        }
    }

    fn labels(self) -> &'static [&'static str] {
        match self {
            FormKind::Expense | FormKind::Revenue => {
                &["Amount (R$)", "Category", "Description (optional)"]
            }
            FormKind::Rename => &["Name"],
            FormKind::ExternalBooking => &["Platform (airbnb/booking)", "Calendar sync URL"],
        }
    }

    fn submit_hint(self) -> &'static str {
        match self {
            FormKind::Expense | FormKind::Revenue => "[Enter] record  [Esc] close",
            FormKind::Rename => "[Enter] save  [Esc] close",
            FormKind::ExternalBooking => "[Enter] link  [Esc] close",
        }
    }
}

/// A validated request built by a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormRequest {
    RecordMovement {
        kind: MovementKind,
        request: RecordMovementRequest,
    },
    UpdateProperty(UpdatePropertyRequest),
    ExternalBooking(ExternalBookingRequest),
}

/// What a key did to the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    Close,
    Submit(FormRequest),
}

#[derive(Debug, Clone)]
pub struct PropertyForm {
    kind: FormKind,
    property_id: String,
    inputs: Vec<TextInput>,
    focus: usize,
    error: Option<String>,
    submitting: bool,
}

impl PropertyForm {
    pub fn new(kind: FormKind, property: &Property) -> Self {
        let inputs = match kind {
            FormKind::Expense | FormKind::Revenue => vec![
                TextInput::new().placeholder("150,00"),
                TextInput::new().placeholder("cleaning"),
                TextInput::new(),
            ],
            FormKind::Rename => vec![TextInput::with_value(property.name.clone())],
            FormKind::ExternalBooking => vec![
                TextInput::new().placeholder("airbnb"),
                TextInput::new().placeholder("https://"),
            ],
        };
        Self {
            kind,
            property_id: property.id.clone(),
            inputs,
            focus: 0,
            error: None,
            submitting: false,
        }
    }

    pub fn kind(&self) -> FormKind {
        self.kind
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Show a server error and accept input again.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.submitting = false;
    }

    fn value(&self, index: usize) -> &str {
        self.inputs.get(index).map(TextInput::value).unwrap_or_default()
    }

    /// Build and validate the request for this form.
    pub fn submit(&self) -> Result<FormRequest, ValidationError> {
        match self.kind {
            FormKind::Expense | FormKind::Revenue => {
                let amount = currency::parse_brl(self.value(0))
                    .ok_or_else(|| ValidationError::new("amount", "must be a number"))?;
                let request = RecordMovementRequest {
                    amount,
                    description: Some(self.value(2).to_string()),
                    category: self.value(1).to_string(),
                    property_id: self.property_id.clone(),
                }
                .validate()?;
                let kind = if self.kind == FormKind::Expense {
                    MovementKind::Expense
                } else {
                    MovementKind::Revenue
                };
                Ok(FormRequest::RecordMovement { kind, request })
            }
            FormKind::Rename => UpdatePropertyRequest {
                name: Some(self.value(0).to_string()),
            }
            .validate()
            .map(FormRequest::UpdateProperty),
            FormKind::ExternalBooking => {
                let platform = Platform::parse(self.value(0)).ok_or_else(|| {
                    ValidationError::new("platform_name", "must be airbnb or booking")
                })?;
                ExternalBookingRequest {
                    platform_name: platform,
                    sync_url: self.value(1).to_string(),
                }
                .validate()
                .map(FormRequest::ExternalBooking)
            }
        }
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Option<FormEvent> {
        let fields = self.inputs.len();
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => return Some(FormEvent::Close),
            (KeyCode::BackTab, _) | (KeyCode::Tab, KeyModifiers::SHIFT) | (KeyCode::Up, _) => {
                self.focus = (self.focus + fields - 1) % fields;
            }
            (KeyCode::Tab, _) | (KeyCode::Down, _) => self.focus = (self.focus + 1) % fields,
            (KeyCode::Enter, _) if self.submitting => {}
            (KeyCode::Enter, _) => match self.submit() {
                Ok(request) => {
                    self.error = None;
                    self.submitting = true;
                    return Some(FormEvent::Submit(request));
                }
                Err(err) => self.error = Some(err.to_string()),
            },
            _ => {
                if let Some(input) = self.inputs.get_mut(self.focus) {
                    if input.handle_input(key) {
                        self.error = None;
                    }
                }
            }
        }
        None
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let labels = self.kind.labels();
        let height = 3 * labels.len() as u16 + 4;
        let area = centered_rect(60, height, area);
        frame.render_widget(Clear, area);
        let block = Block::default()
            .title(Span::styled(self.kind.title(), t.title()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(t.accent));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut constraints: Vec<Constraint> =
            labels.iter().map(|_| Constraint::Length(3)).collect();
        constraints.push(Constraint::Min(1));
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner);

        for (i, label) in labels.iter().enumerate() {
            if let Some(input) = self.inputs.get(i) {
                input.render_with_label(frame, chunks[i], label, i == self.focus);
            }
        }

        let footer = match (&self.error, self.submitting) {
            (Some(error), _) => Line::styled(error.clone(), Style::default().fg(t.error)),
            (None, true) => Line::styled("Saving…", t.muted()),
            (None, false) => Line::styled(self.kind.submit_hint(), t.muted()),
        };
        frame.render_widget(Paragraph::new(footer), chunks[labels.len()]);
    }
}
