//! Application views (screens).
//!
//! Views own their screen state and translate keys into actions for `App`.
//! Tables are driven through the controlled [`Selection`] and
//! [`Pagination`] callbacks: a view hands over its current ids and page,
//! collects what the callback requests and applies it itself.

mod help;
mod properties;
mod property_detail;
mod property_forms;
mod reconcile;

pub use help::{HelpAction, HelpView};
pub use properties::{PropertiesAction, PropertiesView};
pub use property_detail::{DetailAction, PropertyDetailView};
pub use property_forms::{FormKind, FormRequest};
pub use reconcile::{ReconcileAction, ReconcileView};

use crossterm::event::{KeyCode, KeyEvent};

use crate::api::types::PaginatedResponse;
use crate::table::{Identifiable, PageItem, Pagination, PaginationState, Selection};

/// The page a key asks for.
///
/// `h`/`←` and `l`/`→` step; digits jump to that page when it exists. A
/// digit for the page already shown asks for it again, which refetches it.
pub(crate) fn page_request(key: &KeyEvent, page: u32, total_pages: u32) -> Option<u32> {
    let mut requested = None;
    {
        let mut on_change = |p: u32| requested = Some(p);
        let mut pagination = Pagination::new(page, total_pages, &mut on_change);
        match key.code {
            KeyCode::Char('h') | KeyCode::Left => pagination.previous(),
            KeyCode::Char('l') | KeyCode::Right => pagination.next(),
            KeyCode::Char(c @ '1'..='9') => {
                let target = c.to_digit(10).unwrap_or(0);
                if target <= total_pages {
                    pagination.select(PageItem::Page(target));
                }
            }
            _ => {}
        }
    }
    requested
}

/// The selection a key asks for: space toggles the focused row, `a`
/// toggles every row.
pub(crate) fn selection_request<T: Identifiable>(
    key: &KeyEvent,
    rows: &[T],
    selected: &[String],
    focus: usize,
) -> Option<Vec<String>> {
    let mut requested = None;
    {
        let mut on_change = |ids: Vec<String>| requested = Some(ids);
        let mut selection = Selection::with_callback(rows, selected, &mut on_change);
        match key.code {
            KeyCode::Char(' ') => {
                if let Some(row) = rows.get(focus) {
                    selection.handle_select_row(row.id());
                }
            }
            KeyCode::Char('a') => selection.handle_select_all(),
            _ => {}
        }
    }
    requested
}

/// One server-paginated list and its request state.
#[derive(Debug, Clone)]
pub struct PagedRows<T> {
    pub rows: Vec<T>,
    /// 1-based page currently shown or requested.
    pub page: u32,
    pub total_pages: u32,
    pub loading: bool,
    pub error: Option<String>,
    /// Row under the keyboard cursor.
    pub focus: usize,
}

impl<T> Default for PagedRows<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            page: 1,
            total_pages: 0,
            loading: false,
            error: None,
            focus: 0,
        }
    }
}

impl<T> PagedRows<T> {
    /// Mark `page` as requested.
    pub fn start_loading(&mut self, page: u32) {
        self.page = page;
        self.loading = true;
        self.error = None;
    }

    /// Store a fetched page.
    ///
    /// When the list has shrunk below the requested page, the page is
    /// clamped into `1..=total_pages` and the new page is returned so the
    /// caller can fetch it.
    pub fn apply(&mut self, response: PaginatedResponse<T>) -> Option<u32> {
        self.rows = response.data;
        self.total_pages = response.pagination.total_pages;
        self.loading = false;
        self.error = None;
        self.focus = self.focus.min(self.rows.len().saturating_sub(1));

        let clamped = self.page.min(self.total_pages).max(1);
        if clamped == self.page {
            return None;
        }
        self.page = clamped;
        self.loading = true;
        Some(clamped)
    }

    pub fn fail(&mut self, message: String) {
        self.rows.clear();
        self.loading = false;
        self.error = Some(message);
        self.focus = 0;
    }

    pub fn move_down(&mut self) {
        if self.focus + 1 < self.rows.len() {
            self.focus += 1;
        }
    }

    pub fn move_up(&mut self) {
        self.focus = self.focus.saturating_sub(1);
    }

    pub fn focused(&self) -> Option<&T> {
        self.rows.get(self.focus)
    }

    /// Row to highlight, if any.
    pub fn focus_index(&self) -> Option<usize> {
        (!self.rows.is_empty()).then_some(self.focus)
    }

    pub fn pagination_state(&self) -> PaginationState {
        PaginationState::new(self.page, self.total_pages)
    }
}
