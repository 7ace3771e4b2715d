//! Page navigation with ellipsis-compressed page links.

use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

/// Above this many pages the link sequence is compressed with ellipses.
const MAX_UNCOMPRESSED_PAGES: u32 = 7;

/// One entry of the page link sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    /// A concrete, clickable page (1-based).
    Page(u32),
    /// A non-interactive marker for omitted pages.
    Ellipsis,
}

/// Compute the page link sequence for `page` out of `total_pages`.
///
/// Returns an empty sequence when there is at most one page.
pub fn page_items(page: u32, total_pages: u32) -> Vec<PageItem> {
    use PageItem::{Ellipsis, Page};

    if total_pages <= 1 {
        return Vec::new();
    }

    if total_pages <= MAX_UNCOMPRESSED_PAGES {
        return (1..=total_pages).map(Page).collect();
    }

    if page <= 3 {
        vec![Page(1), Page(2), Page(3), Page(4), Ellipsis, Page(total_pages)]
    } else if page >= total_pages - 2 {
        vec![
            Page(1),
            Ellipsis,
            Page(total_pages - 3),
            Page(total_pages - 2),
            Page(total_pages - 1),
            Page(total_pages),
        ]
    } else {
        vec![
            Page(1),
            Ellipsis,
            Page(page - 1),
            Page(page),
            Page(page + 1),
            Ellipsis,
            Page(total_pages),
        ]
    }
}

/// Current page position without a callback, as passed to the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    /// Current page (1-based).
    pub page: u32,
    /// Total number of pages.
    pub total_pages: u32,
}

impl PaginationState {
    /// Create a new pagination state.
    pub fn new(page: u32, total_pages: u32) -> Self {
        Self { page, total_pages }
    }
}

/// The visible pagination controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationControls {
    /// Whether "Previous" is interactive.
    pub previous_enabled: bool,
    /// Whether "Next" is interactive.
    pub next_enabled: bool,
    /// The page link sequence.
    pub items: Vec<PageItem>,
}

/// Pagination with a page-change callback.
pub struct Pagination<'a> {
    page: u32,
    total_pages: u32,
    on_page_change: &'a mut dyn FnMut(u32),
}

impl<'a> Pagination<'a> {
    /// Create new pagination controls.
    pub fn new(page: u32, total_pages: u32, on_page_change: &'a mut dyn FnMut(u32)) -> Self {
        Self {
            page,
            total_pages,
            on_page_change,
        }
    }

    /// The controls to display, or `None` when there is at most one page.
    pub fn controls(&self) -> Option<PaginationControls> {
        controls_for(PaginationState::new(self.page, self.total_pages))
    }

    /// Request the previous page. Does nothing on the first page.
    pub fn previous(&mut self) {
        if self.page > 1 {
            (self.on_page_change)(self.page - 1);
        }
    }

    /// Request the next page. Does nothing on the last page.
    pub fn next(&mut self) {
        if self.page < self.total_pages {
            (self.on_page_change)(self.page + 1);
        }
    }

    /// Request the page of a link. Ellipses are not interactive.
    pub fn select(&mut self, item: PageItem) {
        if let PageItem::Page(page) = item {
            (self.on_page_change)(page);
        }
    }
}

/// Controls for a pagination state, or `None` when there is at most one page.
pub fn controls_for(state: PaginationState) -> Option<PaginationControls> {
    if state.total_pages <= 1 {
        return None;
    }
    Some(PaginationControls {
        previous_enabled: state.page != 1,
        next_enabled: state.page != state.total_pages,
        items: page_items(state.page, state.total_pages),
    })
}

/// Build the pagination line widget.
pub fn pagination_line(state: PaginationState) -> Option<Paragraph<'static>> {
    let controls = controls_for(state)?;

    let enabled = Style::default().fg(Color::Cyan);
    let disabled = Style::default().fg(Color::DarkGray);

    let mut spans = vec![
        Span::styled(
            "‹ Prev",
            if controls.previous_enabled { enabled } else { disabled },
        ),
        Span::raw("  "),
    ];

    for (i, item) in controls.items.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        match item {
            PageItem::Page(page) if *page == state.page => spans.push(Span::styled(
                format!("[{}]", page),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
            PageItem::Page(page) => spans.push(Span::raw(page.to_string())),
            PageItem::Ellipsis => spans.push(Span::styled("…", disabled)),
        }
    }

    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        "Next ›",
        if controls.next_enabled { enabled } else { disabled },
    ));

    Some(Paragraph::new(Line::from(spans)).alignment(Alignment::Center))
}
