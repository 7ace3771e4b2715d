//! Property list screen.
//!
//! The API returns every property at once, so paging happens here.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{layout::Rect, Frame};

use super::page_request;
use crate::api::types::Property;
use crate::format::date::format_date;
use crate::table::{Column, DataTable, PaginationState};

/// Actions returned from the property list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertiesAction {
    /// Open a property's detail screen.
    Open(Property),
}

/// The property list.
#[derive(Debug)]
pub struct PropertiesView {
    properties: Vec<Property>,
    loading: bool,
    error: Option<String>,
    page: u32,
    page_size: usize,
    /// Index within the current page.
    focus: usize,
}

impl PropertiesView {
    pub fn new(page_size: u32) -> Self {
        Self {
            properties: Vec::new(),
            loading: false,
            error: None,
            page: 1,
            page_size: page_size.max(1) as usize,
            focus: 0,
        }
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        if loading {
            self.error = None;
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Replace the list. The page is kept when it still exists.
    pub fn set_properties(&mut self, properties: Vec<Property>) {
        self.properties = properties;
        self.loading = false;
        self.error = None;
        self.page = self.page.min(self.total_pages()).max(1);
        self.focus = self.focus.min(self.page_rows().len().saturating_sub(1));
    }

    pub fn set_error(&mut self, message: String) {
        self.loading = false;
        self.error = Some(message);
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_pages(&self) -> u32 {
        self.properties.len().div_ceil(self.page_size) as u32
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    /// Rows on the current page.
    fn page_rows(&self) -> &[Property] {
        let start = (self.page as usize - 1) * self.page_size;
        let end = (start + self.page_size).min(self.properties.len());
        self.properties.get(start..end).unwrap_or(&[])
    }

    pub fn focused(&self) -> Option<&Property> {
        self.page_rows().get(self.focus)
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Option<PropertiesAction> {
        if let Some(page) = page_request(&key, self.page, self.total_pages()) {
            self.page = page;
            self.focus = 0;
            return None;
        }
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if self.focus + 1 < self.page_rows().len() {
                    self.focus += 1;
                }
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.focus = self.focus.saturating_sub(1);
                None
            }
            KeyCode::Enter => self.focused().cloned().map(PropertiesAction::Open),
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, breakpoint: u16) {
        let columns = columns();
        let rows = self.page_rows();
        DataTable::new(&columns, rows)
            .loading(self.loading)
            .error(self.error.as_deref())
            .focused((!rows.is_empty()).then_some(self.focus))
            .pagination(Some(PaginationState::new(self.page, self.total_pages())))
            .empty_message("No properties yet.")
            .render(frame, area, breakpoint);
    }
}

fn columns() -> Vec<Column<'static, Property>> {
    vec![
        Column::new("Name", "name", |p: &Property| p.name.clone()).mobile_header(),
        Column::new("Created", "created_at", |p: &Property| format_date(&p.created_at)),
        Column::new("Updated", "updated_at", |p: &Property| format_date(&p.updated_at)),
    ]
}
