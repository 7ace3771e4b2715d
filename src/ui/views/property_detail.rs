//! Property detail screen with stays, movements and dashboard tabs.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row, Table, Tabs},
    Frame,
};

use super::property_forms::{FormEvent, FormKind, FormRequest, PropertyForm};
use super::{page_request, selection_request, PagedRows};
use crate::api::types::{FinanceMovement, PaginatedResponse, Property, Stay, StayWithTenant};
use crate::format::{currency::format_brl, date::format_date, date::month_label, phone};
use crate::stats::{self, PropertyNumbers};
use crate::table::{Column, DataTable, LOADING_MESSAGE};
use crate::ui::theme::theme;

/// Tabs of the detail screen, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailTab {
    #[default]
    Stays,
    Movements,
    Dashboard,
}

impl DetailTab {
    const ALL: [DetailTab; 3] = [DetailTab::Stays, DetailTab::Movements, DetailTab::Dashboard];

    pub fn title(self) -> &'static str {
        match self {
            DetailTab::Stays => "Stays",
            DetailTab::Movements => "Movements",
            DetailTab::Dashboard => "Dashboard",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Actions returned from the detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailAction {
    Back,
    /// Fetch this page of stays.
    LoadStays(u32),
    /// Fetch this page of movements.
    LoadMovements(u32),
    /// Cancel these stays once the user confirms.
    CancelStays(Vec<String>),
    /// Send a request built by one of the forms.
    Submit(FormRequest),
    /// Put this text on the clipboard.
    CopyStay(String),
}

/// Dashboard tab state.
#[derive(Debug, Default)]
struct Dashboard {
    stays: Vec<Stay>,
    loading: bool,
    error: Option<String>,
    /// Year shown in the income table.
    year: Option<i32>,
}

/// The property detail screen.
#[derive(Debug)]
pub struct PropertyDetailView {
    property: Property,
    tab: DetailTab,
    stays: PagedRows<StayWithTenant>,
    selected_stays: Vec<String>,
    movements: PagedRows<FinanceMovement>,
    dashboard: Dashboard,
    form: Option<PropertyForm>,
}

impl PropertyDetailView {
    pub fn new(property: Property) -> Self {
        Self {
            property,
            tab: DetailTab::default(),
            stays: PagedRows::default(),
            selected_stays: Vec::new(),
            movements: PagedRows::default(),
            dashboard: Dashboard::default(),
            form: None,
        }
    }

    pub fn property(&self) -> &Property {
        &self.property
    }

    /// Replace the property after an edit.
    pub fn set_property(&mut self, property: Property) {
        self.property = property;
    }

    /// True while a form has the keyboard.
    pub fn is_editing(&self) -> bool {
        self.form.is_some()
    }

    pub fn form(&self) -> Option<&PropertyForm> {
        self.form.as_ref()
    }

    pub fn close_form(&mut self) {
        self.form = None;
    }

    /// Show a failed form request in the open form.
    pub fn form_failed(&mut self, message: String) {
        if let Some(form) = self.form.as_mut() {
            form.fail(message);
        }
    }

    pub fn tab(&self) -> DetailTab {
        self.tab
    }

    pub fn stays(&self) -> &PagedRows<StayWithTenant> {
        &self.stays
    }

    pub fn movements(&self) -> &PagedRows<FinanceMovement> {
        &self.movements
    }

    pub fn selected_stays(&self) -> &[String] {
        &self.selected_stays
    }

    pub fn dashboard_year(&self) -> Option<i32> {
        self.dashboard.year
    }

    pub fn start_loading_stays(&mut self, page: u32) {
        if page != self.stays.page {
            self.selected_stays.clear();
        }
        self.stays.start_loading(page);
    }

    pub fn start_loading_movements(&mut self, page: u32) {
        self.movements.start_loading(page);
    }

    pub fn start_loading_dashboard(&mut self) {
        self.dashboard.loading = true;
        self.dashboard.error = None;
    }

    /// Store a page of stays unless a different page was requested since.
    ///
    /// Returns the page to fetch when the stored page fell past the end.
    pub fn set_stays(
        &mut self,
        page: u32,
        result: Result<PaginatedResponse<StayWithTenant>, String>,
    ) -> Option<u32> {
        if page != self.stays.page {
            return None;
        }
        match result {
            Ok(response) => {
                let refetch = self.stays.apply(response);
                if refetch.is_some() {
                    self.selected_stays.clear();
                }
                refetch
            }
            Err(message) => {
                self.stays.fail(message);
                None
            }
        }
    }

    /// Store a page of movements unless a different page was requested since.
    pub fn set_movements(
        &mut self,
        page: u32,
        result: Result<PaginatedResponse<FinanceMovement>, String>,
    ) -> Option<u32> {
        if page != self.movements.page {
            return None;
        }
        match result {
            Ok(response) => self.movements.apply(response),
            Err(message) => {
                self.movements.fail(message);
                None
            }
        }
    }

    /// Store the dashboard stays and show the newest year.
    pub fn set_dashboard(&mut self, result: Result<Vec<Stay>, String>) {
        self.dashboard.loading = false;
        match result {
            Ok(stays) => {
                let years = stats::available_years(&stays);
                if !self.dashboard.year.is_some_and(|y| years.contains(&y)) {
                    self.dashboard.year = years.first().copied();
                }
                self.dashboard.stays = stays;
                self.dashboard.error = None;
            }
            Err(message) => self.dashboard.error = Some(message),
        }
    }

    /// Drop cancelled stays from the selection.
    pub fn forget_stays(&mut self, ids: &[String]) {
        self.selected_stays.retain(|id| !ids.contains(id));
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Option<DetailAction> {
        if let Some(form) = self.form.as_mut() {
            return match form.handle_input(key) {
                Some(FormEvent::Close) => {
                    self.form = None;
                    None
                }
                Some(FormEvent::Submit(request)) => Some(DetailAction::Submit(request)),
                None => None,
            };
        }
        let open = match key.code {
            KeyCode::Char('e') => Some(FormKind::Expense),
            KeyCode::Char('i') => Some(FormKind::Revenue),
            KeyCode::Char('n') => Some(FormKind::Rename),
            KeyCode::Char('b') => Some(FormKind::ExternalBooking),
            _ => None,
        };
        if let Some(kind) = open {
            self.form = Some(PropertyForm::new(kind, &self.property));
            return None;
        }
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => return Some(DetailAction::Back),
            (KeyCode::BackTab, _) | (KeyCode::Tab, KeyModifiers::SHIFT) => {
                self.tab = self.tab.previous();
                return None;
            }
            (KeyCode::Tab, _) => {
                self.tab = self.tab.next();
                return None;
            }
            _ => {}
        }
        match self.tab {
            DetailTab::Stays => self.handle_stays_input(key),
            DetailTab::Movements => self.handle_movements_input(key),
            DetailTab::Dashboard => {
                self.handle_dashboard_input(key);
                None
            }
        }
    }

    fn handle_stays_input(&mut self, key: KeyEvent) -> Option<DetailAction> {
        if let Some(page) = page_request(&key, self.stays.page, self.stays.total_pages) {
            self.start_loading_stays(page);
            return Some(DetailAction::LoadStays(page));
        }
        if let Some(selection) =
            selection_request(&key, &self.stays.rows, &self.selected_stays, self.stays.focus)
        {
            self.selected_stays = selection;
            return None;
        }
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.stays.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.stays.move_up(),
            KeyCode::Char('x') => {
                return Some(DetailAction::CancelStays(self.selected_stays.clone()));
            }
            KeyCode::Char('c') => {
                return self
                    .stays
                    .focused()
                    .map(|stay| DetailAction::CopyStay(stay_summary(stay)));
            }
            _ => {}
        }
        None
    }

    fn handle_movements_input(&mut self, key: KeyEvent) -> Option<DetailAction> {
        if let Some(page) = page_request(&key, self.movements.page, self.movements.total_pages) {
            self.start_loading_movements(page);
            return Some(DetailAction::LoadMovements(page));
        }
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.movements.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.movements.move_up(),
            _ => {}
        }
        None
    }

    /// `h`/`l` step through the available years.
    fn handle_dashboard_input(&mut self, key: KeyEvent) {
        let years = stats::available_years(&self.dashboard.stays);
        let Some(current) = self
            .dashboard
            .year
            .and_then(|y| years.iter().position(|v| *v == y))
        else {
            return;
        };
        // Years are newest first, so "previous" moves right in the list.
        let next = match key.code {
            KeyCode::Char('h') | KeyCode::Left => current + 1,
            KeyCode::Char('l') | KeyCode::Right => current.saturating_sub(1),
            _ => return,
        };
        if let Some(year) = years.get(next) {
            self.dashboard.year = Some(*year);
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, breakpoint: u16) {
        let t = theme();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(1)])
            .split(area);

        let tabs = Tabs::new(DetailTab::ALL.iter().map(|tab| tab.title()))
            .select(self.tab.index())
            .style(t.muted())
            .highlight_style(t.title().add_modifier(Modifier::UNDERLINED))
            .block(
                Block::default()
                    .borders(Borders::BOTTOM)
                    .border_style(Style::default().fg(t.border)),
            );
        frame.render_widget(tabs, chunks[0]);

        match self.tab {
            DetailTab::Stays => {
                let columns = stay_columns();
                DataTable::new(&columns, &self.stays.rows)
                    .loading(self.stays.loading)
                    .error(self.stays.error.as_deref())
                    .selection(&self.selected_stays)
                    .focused(self.stays.focus_index())
                    .pagination(Some(self.stays.pagination_state()))
                    .empty_message("No stays for this property.")
                    .render(frame, chunks[1], breakpoint);
            }
            DetailTab::Movements => {
                let columns = movement_columns();
                DataTable::new(&columns, &self.movements.rows)
                    .loading(self.movements.loading)
                    .error(self.movements.error.as_deref())
                    .focused(self.movements.focus_index())
                    .pagination(Some(self.movements.pagination_state()))
                    .empty_message("No movements recorded.")
                    .render(frame, chunks[1], breakpoint);
            }
            DetailTab::Dashboard => self.render_dashboard(frame, chunks[1], breakpoint),
        }

        if let Some(form) = &self.form {
            form.render(frame, area);
        }
    }

    fn render_dashboard(&self, frame: &mut Frame, area: Rect, breakpoint: u16) {
        let t = theme();
        if self.dashboard.loading {
            frame.render_widget(Paragraph::new(LOADING_MESSAGE).style(t.muted()), area);
            return;
        }
        if let Some(error) = &self.dashboard.error {
            frame.render_widget(
                Paragraph::new(error.as_str()).style(Style::default().fg(t.error)),
                area,
            );
            return;
        }

        let stays = &self.dashboard.stays;
        let numbers = PropertyNumbers::from_stays(stays);
        let figures = Paragraph::new(vec![
            figure_line("Stays", numbers.stays.to_string()),
            figure_line("Total", format_brl(numbers.total_price)),
            figure_line("Average", format_brl(numbers.average_price)),
        ]);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(1)])
            .split(area);
        frame.render_widget(figures, chunks[0]);

        let direction = if area.width >= breakpoint {
            Direction::Horizontal
        } else {
            Direction::Vertical
        };
        let tables = Layout::default()
            .direction(direction)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);

        let income_title = match self.dashboard.year {
            Some(year) => format!(" Income per month · {} [h/l] ", year),
            None => " Income per month ".to_string(),
        };
        let income = self
            .dashboard
            .year
            .map(|year| stats::income_per_month(stays, year))
            .unwrap_or_default();
        frame.render_widget(
            month_table(
                &income_title,
                income.iter().map(|m| (m.month, m.stays, m.income)),
            ),
            tables[0],
        );

        let cohost = stats::cohost_per_month(stays);
        frame.render_widget(
            month_table(
                " Co-host payment per month ",
                cohost.iter().map(|m| (m.month, m.stays, m.cohost_payment)),
            ),
            tables[1],
        );
    }
}

fn figure_line(label: &str, value: String) -> Line<'static> {
    let t = theme();
    Line::from(vec![
        Span::styled(format!("{:>8}  ", label), t.muted()),
        Span::styled(value, t.title()),
    ])
}

fn month_table<'a>(title: &str, months: impl Iterator<Item = (u32, usize, i64)>) -> Table<'a> {
    let t = theme();
    let rows: Vec<Row> = months
        .map(|(month, stays, amount)| {
            Row::new(vec![
                Line::raw(month_label(month)),
                Line::raw(stays.to_string()).right_aligned(),
                Line::raw(format_brl(amount)).right_aligned(),
            ])
        })
        .collect();
    Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Length(6),
            Constraint::Fill(1),
        ],
    )
    .header(
        Row::new(vec![
            Line::raw("Month"),
            Line::raw("Stays").right_aligned(),
            Line::raw("Amount").right_aligned(),
        ])
        .style(Style::default().fg(t.warning).add_modifier(Modifier::BOLD)),
    )
    .block(
        Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(t.border)),
    )
}

/// Guest, phone, dates and guest count, one per line, for pasting into a
/// message to the host or cleaner.
fn stay_summary(stay: &StayWithTenant) -> String {
    [
        stay.tenant.name.clone(),
        phone::to_human_readable(&stay.tenant.phone),
        format!(
            "{} - {}",
            format_date(&stay.stay.check_in),
            format_date(&stay.stay.check_out)
        ),
        format!("{} hóspedes", stay.stay.guests),
    ]
    .join("\n")
}

fn stay_columns() -> Vec<Column<'static, StayWithTenant>> {
    vec![
        Column::new("Guest", "tenant.name", |s: &StayWithTenant| s.tenant.name.clone())
            .mobile_header(),
        Column::new("Check-in", "check_in", |s: &StayWithTenant| {
            format_date(&s.stay.check_in)
        }),
        Column::new("Check-out", "check_out", |s: &StayWithTenant| {
            format_date(&s.stay.check_out)
        }),
        Column::new("Guests", "guests", |s: &StayWithTenant| s.stay.guests.to_string())
            .align_right(),
        Column::new("Price", "price", |s: &StayWithTenant| format_brl(s.stay.price))
            .align_right(),
        Column::new("Source", "source", |s: &StayWithTenant| s.stay.source.to_string()),
        Column::new("Phone", "tenant.phone", |s: &StayWithTenant| {
            phone::to_human_readable(&s.tenant.phone)
        }),
    ]
}

fn movement_columns() -> Vec<Column<'static, FinanceMovement>> {
    vec![
        Column::new("Description", "description", |m: &FinanceMovement| {
            m.description.clone().unwrap_or_else(|| m.category.clone())
        })
        .mobile_header(),
        Column::new("Category", "category", |m: &FinanceMovement| m.category.clone()),
        Column::new("Amount", "amount", |m: &FinanceMovement| format_brl(m.amount))
            .align_right(),
        Column::new("Date", "created_at", |m: &FinanceMovement| {
            format_date(&m.created_at)
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{PaginationMeta, Sex, StaySource, Tenant};
    use chrono::{TimeZone, Utc};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn property() -> Property {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Property {
            id: "p1".to_string(),
            name: "Beach House".to_string(),
            user_id: "u1".to_string(),
            created_at: at,
            updated_at: at,
            deleted_at: None,
        }
    }

    fn stay(id: &str, year: i32) -> Stay {
        let at = Utc.with_ymd_and_hms(year, 3, 1, 14, 0, 0).unwrap();
        Stay {
            id: id.to_string(),
            check_in: at,
            check_out: at + chrono::Duration::days(2),
            entrance_code: "1234567".to_string(),
            guests: 2,
            price: 100_00,
            source: StaySource::Internal,
            created_at: at,
            updated_at: at,
        }
    }

    fn stay_row(id: &str) -> StayWithTenant {
        let s = stay(id, 2025);
        StayWithTenant {
            tenant: Tenant {
                id: format!("t-{}", id),
                name: "Ana".to_string(),
                phone: "5511987654321".to_string(),
                sex: Sex::Female,
                created_at: s.created_at,
                updated_at: s.updated_at,
            },
            stay: s,
        }
    }

    fn page(ids: &[&str], page: u32, total_pages: u32) -> PaginatedResponse<StayWithTenant> {
        PaginatedResponse {
            data: ids.iter().map(|id| stay_row(id)).collect(),
            pagination: PaginationMeta {
                page,
                limit: 10,
                total: (total_pages * 10) as u64,
                total_pages,
                has_next: page < total_pages,
                has_previous: page > 1,
            },
        }
    }

    fn view_with_stays() -> PropertyDetailView {
        let mut view = PropertyDetailView::new(property());
        view.start_loading_stays(1);
        view.set_stays(1, Ok(page(&["s1", "s2", "s3"], 1, 3)));
        view
    }

    #[test]
    fn test_tab_cycles() {
        let mut view = PropertyDetailView::new(property());
        view.handle_input(key(KeyCode::Tab));
        assert_eq!(view.tab(), DetailTab::Movements);
        view.handle_input(key(KeyCode::Tab));
        view.handle_input(key(KeyCode::Tab));
        assert_eq!(view.tab(), DetailTab::Stays);
        view.handle_input(key(KeyCode::BackTab));
        assert_eq!(view.tab(), DetailTab::Dashboard);
    }

    #[test]
    fn test_space_and_select_all() {
        let mut view = view_with_stays();
        view.handle_input(key(KeyCode::Char('j')));
        view.handle_input(key(KeyCode::Char(' ')));
        assert_eq!(view.selected_stays(), ["s2".to_string()]);

        view.handle_input(key(KeyCode::Char('a')));
        assert_eq!(view.selected_stays().len(), 3);
        view.handle_input(key(KeyCode::Char('a')));
        assert!(view.selected_stays().is_empty());
    }

    #[test]
    fn test_page_change_clears_selection_and_requests_page() {
        let mut view = view_with_stays();
        view.handle_input(key(KeyCode::Char(' ')));
        assert!(!view.selected_stays().is_empty());

        let action = view.handle_input(key(KeyCode::Char('l')));
        assert_eq!(action, Some(DetailAction::LoadStays(2)));
        assert!(view.selected_stays().is_empty());
        assert!(view.stays().loading);
    }

    #[test]
    fn test_stale_page_is_ignored() {
        let mut view = view_with_stays();
        view.handle_input(key(KeyCode::Char('3')));
        view.set_stays(2, Ok(page(&["late"], 2, 3)));
        assert!(view.stays().loading);
        view.set_stays(3, Ok(page(&["s9"], 3, 3)));
        assert_eq!(view.stays().rows[0].stay.id, "s9");
    }

    #[test]
    fn test_x_requests_cancellation_of_selection() {
        let mut view = view_with_stays();
        view.handle_input(key(KeyCode::Char(' ')));
        assert_eq!(
            view.handle_input(key(KeyCode::Char('x'))),
            Some(DetailAction::CancelStays(vec!["s1".to_string()]))
        );
        view.forget_stays(&["s1".to_string()]);
        assert!(view.selected_stays().is_empty());
    }

    #[test]
    fn test_movements_tab_pages_independently() {
        let mut view = view_with_stays();
        view.handle_input(key(KeyCode::Tab));
        view.set_movements(
            1,
            Ok(PaginatedResponse {
                data: vec![],
                pagination: PaginationMeta {
                    page: 1,
                    limit: 10,
                    total: 20,
                    total_pages: 2,
                    has_next: true,
                    has_previous: false,
                },
            }),
        );
        assert_eq!(
            view.handle_input(key(KeyCode::Right)),
            Some(DetailAction::LoadMovements(2))
        );
        assert_eq!(view.stays().page, 1);
    }

    #[test]
    fn test_dashboard_year_navigation() {
        let mut view = PropertyDetailView::new(property());
        view.set_dashboard(Ok(vec![stay("a", 2023), stay("b", 2025), stay("c", 2024)]));
        assert_eq!(view.dashboard_year(), Some(2025));

        view.handle_input(key(KeyCode::Tab));
        view.handle_input(key(KeyCode::Tab));
        view.handle_input(key(KeyCode::Char('h')));
        assert_eq!(view.dashboard_year(), Some(2024));
        view.handle_input(key(KeyCode::Char('h')));
        view.handle_input(key(KeyCode::Char('h')));
        assert_eq!(view.dashboard_year(), Some(2023));
        view.handle_input(key(KeyCode::Char('l')));
        assert_eq!(view.dashboard_year(), Some(2024));
    }

    #[test]
    fn test_esc_goes_back() {
        let mut view = PropertyDetailView::new(property());
        assert_eq!(view.handle_input(key(KeyCode::Esc)), Some(DetailAction::Back));
    }

    #[test]
    fn test_copy_focused_stay_summary() {
        let mut view = view_with_stays();
        assert_eq!(
            view.handle_input(key(KeyCode::Char('c'))),
            Some(DetailAction::CopyStay(
                "Ana\n+55 (11) 98765-4321\n01/03/2025 - 03/03/2025\n2 hóspedes".to_string()
            ))
        );

        let mut empty = PropertyDetailView::new(property());
        assert_eq!(empty.handle_input(key(KeyCode::Char('c'))), None);
    }

    #[test]
    fn test_form_takes_keys_until_closed() {
        let mut view = view_with_stays();
        view.handle_input(key(KeyCode::Char('n')));
        assert!(view.is_editing());
        assert_eq!(view.form().map(|f| f.kind()), Some(FormKind::Rename));

        // Esc closes the form instead of leaving the screen
        assert_eq!(view.handle_input(key(KeyCode::Esc)), None);
        assert!(!view.is_editing());
        assert_eq!(view.handle_input(key(KeyCode::Esc)), Some(DetailAction::Back));
    }

    #[test]
    fn test_form_submit_and_failure() {
        let mut view = view_with_stays();
        view.handle_input(key(KeyCode::Char('n')));
        for _ in 0.."Beach House".len() {
            view.handle_input(key(KeyCode::Backspace));
        }
        for c in "Casa".chars() {
            view.handle_input(key(KeyCode::Char(c)));
        }
        assert_eq!(
            view.handle_input(key(KeyCode::Enter)),
            Some(DetailAction::Submit(FormRequest::UpdateProperty(
                crate::api::types::UpdatePropertyRequest {
                    name: Some("Casa".to_string()),
                }
            )))
        );

        view.form_failed("Conflict: name taken".to_string());
        assert_eq!(view.form().and_then(|f| f.error()), Some("Conflict: name taken"));
        view.close_form();
        assert!(!view.is_editing());
    }

    #[test]
    fn test_form_keys_open_each_form() {
        for (c, kind) in [
            ('e', FormKind::Expense),
            ('i', FormKind::Revenue),
            ('b', FormKind::ExternalBooking),
        ] {
            let mut view = PropertyDetailView::new(property());
            view.handle_input(key(KeyCode::Char(c)));
            assert_eq!(view.form().map(|f| f.kind()), Some(kind));
        }
    }
}
