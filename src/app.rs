//! Main application state and event handling.
//!
//! This module implements The Elm Architecture (TEA) pattern: `update` and
//! `handle_api_message` change state and return the [`AppCommand`]s the
//! main loop should run, `view` draws the current state.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tracing::{debug, info, trace, warn};

use crate::api::types::{
    BookStayRequest, ExternalBookingRequest, PaginationParams, RecordMovementRequest,
    UpdatePropertyRequest,
};
use crate::api::{ApiError, MovementKind};
use crate::config::Settings;
use crate::error::AppError;
use crate::events::Event;
use crate::tasks::ApiMessage;
use crate::ui::theme::theme;
use crate::ui::{
    render_hints, ConfirmAction, ConfirmDialog, DetailAction, ErrorDialog, FormKind, FormRequest,
    HelpAction, HelpView, NotificationManager, PropertiesAction, PropertiesView, PropertyDetailView,
    ReconcileAction, ReconcileView,
};

/// The screen currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Properties,
    PropertyDetail,
    Reconcile,
    Help,
}

/// Requests `App` asks the main loop to run in the background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    FetchProperties,
    FetchStays {
        property_id: String,
        only_incoming: bool,
        params: PaginationParams,
    },
    FetchMovements {
        property_id: String,
        params: PaginationParams,
    },
    FetchDashboard {
        property_id: String,
    },
    FetchExternalStays,
    BookStay {
        external_id: String,
        request: BookStayRequest,
    },
    CancelStays(Vec<String>),
    RecordMovement {
        kind: MovementKind,
        request: RecordMovementRequest,
    },
    UpdateProperty {
        property_id: String,
        request: UpdatePropertyRequest,
    },
    LinkCalendar {
        property_id: String,
        request: ExternalBookingRequest,
    },
    /// Put text on the system clipboard.
    CopyText(String),
}

/// The main application struct that holds all state.
pub struct App {
    screen: Screen,
    /// Where help returns to.
    previous_screen: Screen,
    should_quit: bool,
    page_size: u32,
    breakpoint: u16,
    only_incoming: bool,
    properties: PropertiesView,
    detail: Option<PropertyDetailView>,
    reconcile: ReconcileView,
    help: HelpView,
    notifications: NotificationManager,
    error_dialog: ErrorDialog,
    confirm_dialog: ConfirmDialog,
    /// Stays awaiting confirmation before cancelling.
    pending_cancel: Vec<String>,
}

impl App {
    pub fn new(settings: &Settings) -> Self {
        debug!("Creating new application instance");
        Self {
            screen: Screen::Properties,
            previous_screen: Screen::Properties,
            should_quit: false,
            page_size: settings.page_size,
            breakpoint: settings.narrow_breakpoint,
            only_incoming: settings.only_incoming_stays,
            properties: PropertiesView::new(settings.page_size),
            detail: None,
            reconcile: ReconcileView::new(),
            help: HelpView::new(),
            notifications: NotificationManager::new(),
            error_dialog: ErrorDialog::new(),
            confirm_dialog: ConfirmDialog::new(),
            pending_cancel: Vec::new(),
        }
    }

    /// Commands to run at startup.
    pub fn init(&mut self) -> Vec<AppCommand> {
        self.properties.set_loading(true);
        vec![AppCommand::FetchProperties]
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn notifications(&self) -> &NotificationManager {
        &self.notifications
    }

    pub fn is_error_dialog_visible(&self) -> bool {
        self.error_dialog.is_visible()
    }

    pub fn is_confirm_visible(&self) -> bool {
        self.confirm_dialog.is_visible()
    }

    pub fn detail(&self) -> Option<&PropertyDetailView> {
        self.detail.as_ref()
    }

    /// Show critical errors in a dialog and the rest as toasts.
    pub fn handle_error(&mut self, error: &AppError) {
        if error.is_critical() {
            warn!(error = %error, "Critical error occurred");
            self.error_dialog.show(error);
        } else {
            debug!(error = %error, "Recoverable error occurred");
            self.notifications.error(error.user_message());
        }
    }

    /// Route an API error that a view also shows inline.
    ///
    /// Only critical errors interrupt; the message is returned for the view.
    fn inline_error(&mut self, error: ApiError) -> String {
        let error = AppError::from(error);
        if error.is_critical() {
            warn!(error = %error, "Critical error occurred");
            self.error_dialog.show(&error);
        }
        error.user_message()
    }

    /// Update state from a terminal event.
    pub fn update(&mut self, event: Event) -> Vec<AppCommand> {
        match event {
            Event::Quit => {
                info!("Quit event received");
                self.should_quit = true;
                Vec::new()
            }
            Event::Key(key) => {
                trace!(key = ?key.code, modifiers = ?key.modifiers, "Key event");
                self.handle_key_event(key)
            }
            Event::Resize(width, height) => {
                trace!(width, height, "Terminal resize event");
                Vec::new()
            }
            Event::Tick => {
                self.notifications.tick();
                Vec::new()
            }
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Vec<AppCommand> {
        // Error dialog blocks all other input
        if self.error_dialog.is_visible() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                self.error_dialog.dismiss();
            }
            return Vec::new();
        }

        if self.confirm_dialog.is_visible() {
            return match self.confirm_dialog.handle_input(key) {
                Some(ConfirmAction::Confirm) => {
                    let ids = std::mem::take(&mut self.pending_cancel);
                    info!(count = ids.len(), "Cancelling stays");
                    vec![AppCommand::CancelStays(ids)]
                }
                Some(ConfirmAction::Cancel) => {
                    self.pending_cancel.clear();
                    Vec::new()
                }
                None => Vec::new(),
            };
        }

        if (key.code, key.modifiers) == (KeyCode::Char('c'), KeyModifiers::CONTROL) {
            self.should_quit = true;
            return Vec::new();
        }

        // Open forms take every other key
        if self.screen == Screen::Reconcile && self.reconcile.is_editing() {
            return self.handle_reconcile_key(key);
        }
        if self.screen == Screen::PropertyDetail
            && self.detail.as_ref().is_some_and(|d| d.is_editing())
        {
            return self.handle_detail_key(key);
        }

        if self.screen == Screen::Help {
            if let Some(HelpAction::Close) = self.help.handle_input(key) {
                self.screen = self.previous_screen;
            }
            return Vec::new();
        }

        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return Vec::new();
            }
            KeyCode::Char('?') => {
                self.previous_screen = self.screen;
                self.help.reset_scroll();
                self.screen = Screen::Help;
                return Vec::new();
            }
            KeyCode::Char('R') => {
                if self.screen != Screen::Reconcile {
                    self.previous_screen = self.screen;
                    self.screen = Screen::Reconcile;
                }
                return self.refresh();
            }
            KeyCode::Char('r') => return self.refresh(),
            _ => {}
        }

        match self.screen {
            Screen::Properties => match self.properties.handle_input(key) {
                Some(PropertiesAction::Open(property)) => {
                    debug!(property_id = %property.id, "Opening property");
                    self.detail = Some(PropertyDetailView::new(property));
                    self.screen = Screen::PropertyDetail;
                    self.refresh()
                }
                None => Vec::new(),
            },
            Screen::PropertyDetail => self.handle_detail_key(key),
            Screen::Reconcile => self.handle_reconcile_key(key),
            Screen::Help => Vec::new(),
        }
    }

    fn handle_detail_key(&mut self, key: KeyEvent) -> Vec<AppCommand> {
        let Some(detail) = self.detail.as_mut() else {
            self.screen = Screen::Properties;
            return Vec::new();
        };
        let property_id = detail.property().id.clone();
        match detail.handle_input(key) {
            Some(DetailAction::Back) => {
                self.detail = None;
                self.screen = Screen::Properties;
                Vec::new()
            }
            Some(DetailAction::LoadStays(page)) => {
                detail.start_loading_stays(page);
                vec![self.fetch_stays(property_id, page)]
            }
            Some(DetailAction::LoadMovements(page)) => {
                detail.start_loading_movements(page);
                vec![AppCommand::FetchMovements {
                    property_id,
                    params: PaginationParams::new(page, self.page_size),
                }]
            }
            Some(DetailAction::CancelStays(ids)) => {
                if ids.is_empty() {
                    self.notifications.warning("Select stays with Space first");
                } else {
                    let message = format!(
                        "Cancel {} selected stay{}? This cannot be undone.",
                        ids.len(),
                        if ids.len() == 1 { "" } else { "s" }
                    );
                    self.pending_cancel = ids;
                    self.confirm_dialog.show("Cancel stays", message);
                }
                Vec::new()
            }
            Some(DetailAction::Submit(request)) => {
                info!(property_id = %property_id, "Submitting property form");
                vec![match request {
                    FormRequest::RecordMovement { kind, request } => {
                        AppCommand::RecordMovement { kind, request }
                    }
                    FormRequest::UpdateProperty(request) => AppCommand::UpdateProperty {
                        property_id,
                        request,
                    },
                    FormRequest::ExternalBooking(request) => AppCommand::LinkCalendar {
                        property_id,
                        request,
                    },
                }]
            }
            Some(DetailAction::CopyStay(text)) => {
                self.notifications.success("Stay details copied");
                vec![AppCommand::CopyText(text)]
            }
            None => Vec::new(),
        }
    }

    fn handle_reconcile_key(&mut self, key: KeyEvent) -> Vec<AppCommand> {
        if !self.reconcile.is_editing() && key.code == KeyCode::Esc {
            self.screen = match self.previous_screen {
                Screen::Reconcile | Screen::Help => Screen::Properties,
                screen => screen,
            };
            return Vec::new();
        }
        match self.reconcile.handle_input(key) {
            Some(ReconcileAction::Book {
                external_id,
                request,
            }) => {
                info!(property_id = %request.property, "Booking external stay");
                vec![AppCommand::BookStay {
                    external_id,
                    request,
                }]
            }
            None => Vec::new(),
        }
    }

    fn fetch_stays(&self, property_id: String, page: u32) -> AppCommand {
        AppCommand::FetchStays {
            property_id,
            only_incoming: self.only_incoming,
            params: PaginationParams::new(page, self.page_size),
        }
    }

    /// Reload whatever the current screen shows.
    fn refresh(&mut self) -> Vec<AppCommand> {
        match self.screen {
            Screen::Properties | Screen::Help => {
                self.properties.set_loading(true);
                vec![AppCommand::FetchProperties]
            }
            Screen::PropertyDetail => {
                let Some(detail) = self.detail.as_mut() else {
                    return Vec::new();
                };
                let property_id = detail.property().id.clone();
                let stays_page = detail.stays().page;
                let movements_page = detail.movements().page;
                detail.start_loading_stays(stays_page);
                detail.start_loading_movements(movements_page);
                detail.start_loading_dashboard();
                vec![
                    self.fetch_stays(property_id.clone(), stays_page),
                    AppCommand::FetchMovements {
                        property_id: property_id.clone(),
                        params: PaginationParams::new(movements_page, self.page_size),
                    },
                    AppCommand::FetchDashboard { property_id },
                ]
            }
            Screen::Reconcile => {
                self.reconcile.set_loading(true);
                vec![AppCommand::FetchExternalStays]
            }
        }
    }

    /// The open detail view, if it shows `property_id`.
    fn detail_for(&mut self, property_id: &str) -> Option<&mut PropertyDetailView> {
        self.detail
            .as_mut()
            .filter(|detail| detail.property().id == property_id)
    }

    /// Update state from a finished background task.
    pub fn handle_api_message(&mut self, message: ApiMessage) -> Vec<AppCommand> {
        match message {
            ApiMessage::PropertiesFetched(Ok(properties)) => {
                debug!(count = properties.len(), "Properties loaded");
                self.properties.set_properties(properties);
            }
            ApiMessage::PropertiesFetched(Err(e)) => {
                let message = self.inline_error(e);
                self.properties.set_error(message);
            }
            ApiMessage::StaysFetched {
                property_id,
                page,
                result,
            } => {
                if self.detail_for(&property_id).is_none() {
                    debug!(property_id = %property_id, "Ignoring stays for a closed property");
                    return Vec::new();
                }
                let result = result.map_err(|e| self.inline_error(e));
                let refetch = self
                    .detail_for(&property_id)
                    .and_then(|detail| detail.set_stays(page, result));
                if let Some(page) = refetch {
                    debug!(page, "Stays page out of range, fetching the last page");
                    return vec![self.fetch_stays(property_id, page)];
                }
            }
            ApiMessage::MovementsFetched {
                property_id,
                page,
                result,
            } => {
                if self.detail_for(&property_id).is_none() {
                    return Vec::new();
                }
                let result = result.map_err(|e| self.inline_error(e));
                let refetch = self
                    .detail_for(&property_id)
                    .and_then(|detail| detail.set_movements(page, result));
                if let Some(page) = refetch {
                    return vec![AppCommand::FetchMovements {
                        property_id,
                        params: PaginationParams::new(page, self.page_size),
                    }];
                }
            }
            ApiMessage::DashboardStaysFetched {
                property_id,
                result,
            } => {
                if self.detail_for(&property_id).is_none() {
                    return Vec::new();
                }
                let result = result.map_err(|e| self.inline_error(e));
                if let Some(detail) = self.detail_for(&property_id) {
                    detail.set_dashboard(result);
                }
            }
            ApiMessage::ExternalStaysFetched(Ok(stays)) => {
                debug!(count = stays.len(), "External stays loaded");
                self.reconcile.set_stays(stays);
            }
            ApiMessage::ExternalStaysFetched(Err(e)) => {
                let message = self.inline_error(e);
                self.reconcile.set_error(message);
            }
            ApiMessage::StayBooked {
                external_id,
                result: Ok(stay),
            } => {
                info!(stay_id = %stay.id, "Stay booked");
                self.reconcile.remove_stay(&external_id);
                self.notifications.success("Stay booked");
                self.reconcile.set_loading(true);
                return vec![AppCommand::FetchExternalStays];
            }
            ApiMessage::StayBooked {
                external_id,
                result: Err(e),
            } => {
                let message = self.inline_error(e);
                self.reconcile.booking_failed(&external_id, message);
            }
            ApiMessage::StaysCancelled { cancelled, failed } => {
                return self.handle_stays_cancelled(cancelled, failed);
            }
            ApiMessage::MovementRecorded {
                property_id,
                kind,
                result,
            } => return self.handle_movement_recorded(property_id, kind, result),
            ApiMessage::PropertyUpdated {
                property_id,
                result,
            } => match result {
                Ok(property) => {
                    info!(property_id = %property.id, "Property updated");
                    if let Some(detail) = self.detail_for(&property_id) {
                        detail.set_property(property);
                        detail.close_form();
                    }
                    self.notifications.success("Property updated");
                    self.properties.set_loading(true);
                    return vec![AppCommand::FetchProperties];
                }
                Err(e) => self.form_failed(&property_id, e),
            },
            ApiMessage::CalendarLinked {
                property_id,
                result,
            } => match result {
                Ok(response) => {
                    if let Some(detail) = self.detail_for(&property_id) {
                        detail.close_form();
                    }
                    self.notifications.success(response.message);
                }
                Err(e) => self.form_failed(&property_id, e),
            },
        }
        Vec::new()
    }

    fn handle_movement_recorded(
        &mut self,
        property_id: String,
        kind: MovementKind,
        result: Result<(), ApiError>,
    ) -> Vec<AppCommand> {
        if let Err(e) = result {
            self.form_failed(&property_id, e);
            return Vec::new();
        }
        self.notifications.success(match kind {
            MovementKind::Expense => "Expense recorded",
            MovementKind::Revenue => "Revenue recorded",
        });
        let page_size = self.page_size;
        let Some(detail) = self.detail_for(&property_id) else {
            return Vec::new();
        };
        detail.close_form();
        let page = detail.movements().page;
        detail.start_loading_movements(page);
        vec![AppCommand::FetchMovements {
            property_id,
            params: PaginationParams::new(page, page_size),
        }]
    }

    /// Show a failed form request in the form that sent it.
    fn form_failed(&mut self, property_id: &str, error: ApiError) {
        let message = self.inline_error(error);
        if let Some(detail) = self.detail_for(property_id) {
            detail.form_failed(message);
            return;
        }
        self.notifications.error(message);
    }

    fn handle_stays_cancelled(
        &mut self,
        cancelled: Vec<String>,
        failed: Vec<(String, ApiError)>,
    ) -> Vec<AppCommand> {
        if !cancelled.is_empty() {
            self.notifications
                .success(format!("Cancelled {} stay(s)", cancelled.len()));
        }
        let failed_count = failed.len();
        if let Some((id, error)) = failed.into_iter().next() {
            let error = AppError::from(error);
            if error.is_critical() {
                self.error_dialog.show(&error);
            } else {
                warn!(stay_id = %id, error = %error, "Stay cancellation failed");
                self.notifications.error(format!(
                    "Could not cancel {} stay(s): {}",
                    failed_count,
                    error.user_message()
                ));
            }
        }

        let Some(detail) = self.detail.as_mut() else {
            return Vec::new();
        };
        detail.forget_stays(&cancelled);
        if cancelled.is_empty() {
            return Vec::new();
        }
        let property_id = detail.property().id.clone();
        let page = detail.stays().page;
        detail.start_loading_stays(page);
        detail.start_loading_dashboard();
        vec![
            self.fetch_stays(property_id.clone(), page),
            AppCommand::FetchDashboard { property_id },
        ]
    }

    /// Draw the current state.
    pub fn view(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Header
                Constraint::Min(1),    // Content
                Constraint::Length(1), // Key hints
            ])
            .split(area);

        self.render_header(frame, chunks[0]);
        match self.screen {
            Screen::Properties => self.properties.render(frame, chunks[1], self.breakpoint),
            Screen::PropertyDetail => {
                if let Some(detail) = &self.detail {
                    detail.render(frame, chunks[1], self.breakpoint);
                }
            }
            Screen::Reconcile => self.reconcile.render(frame, chunks[1], self.breakpoint),
            Screen::Help => self.help.render(frame, chunks[1]),
        }
        render_hints(frame, chunks[2], self.hints());

        self.notifications.render(frame, area);
        self.confirm_dialog.render(frame, area);
        self.error_dialog.render(frame, area);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let location = match self.screen {
            Screen::Properties => "Properties".to_string(),
            Screen::PropertyDetail => self
                .detail
                .as_ref()
                .map(|d| format!("Properties › {}", d.property().name))
                .unwrap_or_default(),
            Screen::Reconcile => "Reconcile external stays".to_string(),
            Screen::Help => "Help".to_string(),
        };
        let header = Paragraph::new(Line::from(vec![
            Span::styled(" StayHub ", t.title()),
            Span::styled(location, t.muted()),
        ]))
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(t.border)),
        );
        frame.render_widget(header, area);
    }

    fn hints(&self) -> &'static str {
        match self.screen {
            Screen::Properties => "[j/k] move  [h/l] page  [Enter] open  [R] reconcile  [r] refresh  [?] help  [q] quit",
            Screen::PropertyDetail if self.detail.as_ref().is_some_and(|d| d.is_editing()) => {
                match self.detail.as_ref().and_then(|d| d.form()) {
                    Some(form) if form.is_submitting() => "Saving…  [Esc] close",
                    Some(form) if form.kind() == FormKind::Rename => "[Enter] save  [Esc] close",
                    _ => "[Tab] next field  [Enter] submit  [Esc] close",
                }
            }
            Screen::PropertyDetail => "[Tab] tab  [Space] select  [x] cancel  [c] copy  [e/i] expense/revenue  [n] rename  [b] link  [Esc] back",
            Screen::Reconcile if self.reconcile.is_editing() => "[Tab] next field  [Ctrl+G] code  [Enter] book  [Esc] close",
            Screen::Reconcile => "[j/k] move  [Enter] book  [r] refresh  [Esc] back",
            Screen::Help => "[j/k] scroll  [Esc] close",
        }
    }
}
