//! External stays waiting to be booked.
//!
//! The list is short and comes back whole, so it is not paged. `Enter`
//! opens a [`BookingForm`] for the focused stay.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use rand::Rng;

use crate::api::types::{BookStayRequest, ExternalStay, Sex, TenantInput};
use crate::api::ValidationError;
use crate::format::date::format_date;
use crate::table::{Column, DataTable, Identifiable};
use crate::ui::components::{centered_rect, TextInput};
use crate::ui::theme::theme;

/// Actions returned from the reconcile screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileAction {
    /// Book the external stay with this key.
    Book {
        external_id: String,
        request: BookStayRequest,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    EntranceCode,
    Name,
    Phone,
    Sex,
    Guests,
}

impl Field {
    const ALL: [Field; 5] = [
        Field::EntranceCode,
        Field::Name,
        Field::Phone,
        Field::Sex,
        Field::Guests,
    ];

    fn label(self) -> &'static str {
        match self {
            Field::EntranceCode => "Entrance code (Ctrl+G generates)",
            Field::Name => "Guest name",
            Field::Phone => "Guest phone",
            Field::Sex => "Sex (m/f/o)",
            Field::Guests => "Guests",
        }
    }
}

/// Booking form for one external stay.
#[derive(Debug, Clone)]
pub struct BookingForm {
    stay: ExternalStay,
    inputs: [TextInput; 5],
    focus: usize,
    error: Option<String>,
}

impl BookingForm {
    pub fn new(stay: ExternalStay) -> Self {
        Self {
            stay,
            inputs: [
                TextInput::new().placeholder("7 digits or more"),
                TextInput::new(),
                TextInput::new().placeholder("+55 (11) 91234-5678"),
                TextInput::new().placeholder("m, f or o"),
                TextInput::with_value("1"),
            ],
            focus: 0,
            error: None,
        }
    }

    pub fn stay(&self) -> &ExternalStay {
        &self.stay
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Show an error returned by the server.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    fn input(&self, field: Field) -> &TextInput {
        &self.inputs[field as usize]
    }

    fn focused_field(&self) -> Field {
        Field::ALL[self.focus]
    }

    fn next_field(&mut self) {
        self.focus = (self.focus + 1) % Field::ALL.len();
    }

    fn previous_field(&mut self) {
        self.focus = (self.focus + Field::ALL.len() - 1) % Field::ALL.len();
    }

    /// Fill the entrance code with a random 7-digit number.
    fn generate_entrance_code(&mut self) {
        let code: u32 = rand::rng().random_range(1_000_000..10_000_000);
        self.inputs[Field::EntranceCode as usize].set_value(code.to_string());
    }

    /// Build and validate the booking request.
    pub fn submit(&self) -> Result<BookStayRequest, ValidationError> {
        let sex = Sex::parse(self.input(Field::Sex).value())
            .ok_or_else(|| ValidationError::new("tenant.sex", "must be m, f or o"))?;
        let guests = self
            .input(Field::Guests)
            .value()
            .trim()
            .parse::<u32>()
            .map_err(|_| ValidationError::new("guests", "must be a number"))?;
        let tenant = TenantInput {
            name: self.input(Field::Name).value().to_string(),
            phone: self.input(Field::Phone).value().to_string(),
            sex,
        };
        BookStayRequest::for_external_stay(
            &self.stay,
            self.input(Field::EntranceCode).value().to_string(),
            tenant,
            guests,
        )
        .validate()
    }

    /// Handle a key. `Some(None)` closes the form.
    fn handle_input(&mut self, key: KeyEvent) -> Option<Option<ReconcileAction>> {
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => return Some(None),
            (KeyCode::BackTab, _) | (KeyCode::Tab, KeyModifiers::SHIFT) | (KeyCode::Up, _) => {
                self.previous_field()
            }
            (KeyCode::Tab, _) | (KeyCode::Down, _) => self.next_field(),
            (KeyCode::Char('g'), KeyModifiers::CONTROL) => self.generate_entrance_code(),
            (KeyCode::Enter, _) => match self.submit() {
                Ok(request) => {
                    self.error = None;
                    return Some(Some(ReconcileAction::Book {
                        external_id: self.stay.id().to_string(),
                        request,
                    }));
                }
                Err(err) => self.error = Some(err.to_string()),
            },
            _ => {
                let field = self.focused_field();
                if self.inputs[field as usize].handle_input(key) {
                    self.error = None;
                }
            }
        }
        None
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let area = centered_rect(60, 24, area);
        frame.render_widget(Clear, area);
        let block = Block::default()
            .title(Span::styled(" Book external stay ", t.title()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(t.accent));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut constraints = vec![Constraint::Length(2)];
        constraints.extend(Field::ALL.iter().map(|_| Constraint::Length(3)));
        constraints.push(Constraint::Min(1));
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner);

        let summary = vec![
            Line::from(vec![
                Span::styled(self.stay.property.name.clone(), t.title()),
                Span::styled(format!("  {}", self.stay.source_platform), t.muted()),
            ]),
            Line::styled(
                format!(
                    "{} → {}",
                    format_date(&self.stay.start),
                    format_date(&self.stay.end)
                ),
                t.muted(),
            ),
        ];
        frame.render_widget(Paragraph::new(summary), chunks[0]);

        for (i, field) in Field::ALL.iter().enumerate() {
            self.inputs[i].render_with_label(frame, chunks[i + 1], field.label(), i == self.focus);
        }

        let footer = match &self.error {
            Some(error) => Line::styled(error.clone(), Style::default().fg(t.error)),
            None => Line::styled("[Enter] book  [Esc] close", t.muted()),
        };
        frame.render_widget(Paragraph::new(footer), chunks[Field::ALL.len() + 1]);
    }
}

/// The reconcile screen.
#[derive(Debug, Default)]
pub struct ReconcileView {
    stays: Vec<ExternalStay>,
    loading: bool,
    error: Option<String>,
    focus: usize,
    form: Option<BookingForm>,
}

impl ReconcileView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        if loading {
            self.error = None;
        }
    }

    pub fn set_stays(&mut self, stays: Vec<ExternalStay>) {
        self.stays = stays;
        self.loading = false;
        self.error = None;
        self.focus = self.focus.min(self.stays.len().saturating_sub(1));
    }

    pub fn set_error(&mut self, message: String) {
        self.loading = false;
        self.error = Some(message);
    }

    pub fn stays(&self) -> &[ExternalStay] {
        &self.stays
    }

    /// Drop a booked stay and close its form.
    pub fn remove_stay(&mut self, external_id: &str) {
        self.stays.retain(|s| s.id() != external_id);
        self.focus = self.focus.min(self.stays.len().saturating_sub(1));
        if self.form.as_ref().is_some_and(|f| f.stay.id() == external_id) {
            self.form = None;
        }
    }

    /// True while the booking form has the keyboard.
    pub fn is_editing(&self) -> bool {
        self.form.is_some()
    }

    pub fn form(&self) -> Option<&BookingForm> {
        self.form.as_ref()
    }

    /// Show a booking failure in the open form.
    pub fn booking_failed(&mut self, external_id: &str, message: String) {
        if let Some(form) = self.form.as_mut().filter(|f| f.stay.id() == external_id) {
            form.set_error(message);
        }
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Option<ReconcileAction> {
        if let Some(form) = self.form.as_mut() {
            return match form.handle_input(key) {
                Some(None) => {
                    self.form = None;
                    None
                }
                Some(action) => action,
                None => None,
            };
        }
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if self.focus + 1 < self.stays.len() {
                    self.focus += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => self.focus = self.focus.saturating_sub(1),
            KeyCode::Enter => {
                if let Some(stay) = self.stays.get(self.focus) {
                    self.form = Some(BookingForm::new(stay.clone()));
                }
            }
            _ => {}
        }
        None
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, breakpoint: u16) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(1)])
            .split(area);

        let summary = if self.loading {
            String::new()
        } else {
            format!("{} external stays not booked yet.", self.stays.len())
        };
        frame.render_widget(Paragraph::new(summary).style(theme().muted()), chunks[0]);

        let columns = columns();
        DataTable::new(&columns, &self.stays)
            .loading(self.loading)
            .error(self.error.as_deref())
            .focused((!self.stays.is_empty()).then_some(self.focus))
            .empty_message("No external stays to reconcile.")
            .render(frame, chunks[1], breakpoint);

        if let Some(form) = &self.form {
            form.render(frame, area);
        }
    }
}

fn columns() -> Vec<Column<'static, ExternalStay>> {
    vec![
        Column::new("Property", "property", |s: &ExternalStay| s.property.name.clone())
            .mobile_header(),
        Column::new("Platform", "source_platform", |s: &ExternalStay| {
            s.source_platform.clone()
        }),
        Column::new("Check-in", "start", |s: &ExternalStay| format_date(&s.start)),
        Column::new("Check-out", "end", |s: &ExternalStay| format_date(&s.end)),
        Column::new("Nights", "nights", |s: &ExternalStay| {
            (s.end - s.start).num_days().to_string()
        }),
    ]
}
