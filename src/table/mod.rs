//! Generic data table with row selection and pagination.
//!
//! The table is a controlled component: every frame it receives the rows,
//! column descriptors, selection and page position from its owner and
//! produces a view. Changes are requested through [`Selection`] and
//! [`Pagination`] callbacks and applied by the owner.
//!
//! Two layouts exist. Wide terminals get a grid with one column per
//! descriptor; narrow terminals get stacked cards. Only one is drawn per
//! frame, chosen from the available width.

mod column;
mod pagination;
mod selection;

pub use column::{CellAttrs, Column, Identifiable, MobileOptions};
pub use pagination::{
    controls_for, page_items, pagination_line, PageItem, Pagination, PaginationControls,
    PaginationState,
};
pub use selection::{Selection, SelectionCallback};

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

/// Message shown while data is loading.
pub const LOADING_MESSAGE: &str = "Loading...";

/// Which of the two layouts is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// Grid layout, one column per descriptor.
    Wide,
    /// Stacked cards with label/value pairs.
    Narrow,
}

impl LayoutMode {
    /// Choose the layout for an available width.
    pub fn for_width(width: u16, breakpoint: u16) -> Self {
        if width >= breakpoint {
            LayoutMode::Wide
        } else {
            LayoutMode::Narrow
        }
    }
}

/// Checkbox state for the select-all header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderCheck {
    /// Nothing selected.
    Unchecked,
    /// Some but not all rows selected.
    Partial,
    /// All rows selected.
    Checked,
}

impl HeaderCheck {
    fn symbol(self) -> &'static str {
        match self {
            HeaderCheck::Unchecked => "[ ]",
            HeaderCheck::Partial => "[-]",
            HeaderCheck::Checked => "[x]",
        }
    }
}

fn row_checkbox(selected: bool) -> &'static str {
    if selected {
        "[x]"
    } else {
        "[ ]"
    }
}

/// One rendered row of the wide layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WideRow {
    /// Row id.
    pub id: String,
    /// Checkbox state when selection is enabled.
    pub selected: Option<bool>,
    /// Cell contents, one per column.
    pub cells: Vec<String>,
}

/// Description of the wide layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WideTable {
    /// Select-all checkbox when selection is enabled.
    pub header_check: Option<HeaderCheck>,
    /// Column header labels.
    pub headers: Vec<String>,
    /// Per-column cell attributes.
    pub attrs: Vec<CellAttrs>,
    /// Rows in input order.
    pub rows: Vec<WideRow>,
}

/// One label/value pair inside a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardField {
    /// Column header.
    pub label: String,
    /// Rendered value.
    pub value: String,
}

/// One card of the narrow layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    /// Row id.
    pub id: String,
    /// Checkbox state when selection is enabled.
    pub selected: Option<bool>,
    /// Card title from the header column, if any column is flagged.
    pub title: Option<String>,
    /// Remaining columns in their original order.
    pub fields: Vec<CardField>,
}

/// What the table shows for the current props.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableView {
    /// Data is loading. No rows are shown.
    Loading,
    /// The owner reported an error. No rows are shown.
    Error(String),
    /// Grid layout.
    Wide(WideTable),
    /// Card layout.
    Narrow(Vec<Card>),
}

/// A data table over rows of type `T`.
pub struct DataTable<'a, T> {
    columns: &'a [Column<'a, T>],
    data: &'a [T],
    is_loading: bool,
    error: Option<&'a str>,
    enable_row_selection: bool,
    selected_rows: &'a [String],
    focused_row: Option<usize>,
    pagination: Option<PaginationState>,
    empty_message: Option<&'a str>,
}

impl<'a, T: Identifiable> DataTable<'a, T> {
    /// Create a table over `data` with the given columns.
    pub fn new(columns: &'a [Column<'a, T>], data: &'a [T]) -> Self {
        Self {
            columns,
            data,
            is_loading: false,
            error: None,
            enable_row_selection: false,
            selected_rows: &[],
            focused_row: None,
            pagination: None,
            empty_message: None,
        }
    }

    /// Set the loading flag.
    pub fn loading(mut self, is_loading: bool) -> Self {
        self.is_loading = is_loading;
        self
    }

    /// Set the error text shown in place of the rows.
    pub fn error(mut self, error: Option<&'a str>) -> Self {
        self.error = error;
        self
    }

    /// Enable row selection with the owner's current selection.
    pub fn selection(mut self, selected_rows: &'a [String]) -> Self {
        self.enable_row_selection = true;
        self.selected_rows = selected_rows;
        self
    }

    /// Highlight the row under the keyboard cursor.
    pub fn focused(mut self, focused_row: Option<usize>) -> Self {
        self.focused_row = focused_row;
        self
    }

    /// Show pagination controls below the rows.
    pub fn pagination(mut self, pagination: Option<PaginationState>) -> Self {
        self.pagination = pagination;
        self
    }

    /// Text shown when there are no rows.
    pub fn empty_message(mut self, message: &'a str) -> Self {
        self.empty_message = Some(message);
        self
    }

    /// Selection derivations for the current props.
    pub fn selection_state(&self) -> Selection<'a, T> {
        Selection::new(self.data, self.selected_rows)
    }

    /// Describe what the table shows in the given layout.
    pub fn view(&self, mode: LayoutMode) -> TableView {
        if self.is_loading {
            return TableView::Loading;
        }
        if let Some(error) = self.error.filter(|e| !e.is_empty()) {
            return TableView::Error(error.to_string());
        }
        match mode {
            LayoutMode::Wide => TableView::Wide(self.wide_view()),
            LayoutMode::Narrow => TableView::Narrow(self.narrow_view()),
        }
    }

    fn checkbox_for(&self, selection: &Selection<'_, T>, row: &T) -> Option<bool> {
        self.enable_row_selection
            .then(|| selection.is_row_selected(row.id()))
    }

    fn wide_view(&self) -> WideTable {
        let selection = self.selection_state();
        let header_check = self.enable_row_selection.then(|| {
            if selection.all_selected() {
                HeaderCheck::Checked
            } else if selection.some_selected() {
                HeaderCheck::Partial
            } else {
                HeaderCheck::Unchecked
            }
        });

        let rows = self
            .data
            .iter()
            .map(|row| WideRow {
                id: row.id().to_string(),
                selected: self.checkbox_for(&selection, row),
                cells: self.columns.iter().map(|c| c.render_cell(row)).collect(),
            })
            .collect();

        WideTable {
            header_check,
            headers: self.columns.iter().map(|c| c.header.clone()).collect(),
            attrs: self.columns.iter().map(|c| c.attrs()).collect(),
            rows,
        }
    }

    fn narrow_view(&self) -> Vec<Card> {
        let selection = self.selection_state();
        let header_column = self.columns.iter().find(|c| c.is_mobile_header());

        self.data
            .iter()
            .map(|row| Card {
                id: row.id().to_string(),
                selected: self.checkbox_for(&selection, row),
                title: header_column.map(|c| c.render_cell(row)),
                fields: self
                    .columns
                    .iter()
                    .filter(|c| !c.is_mobile_header())
                    .map(|c| CardField {
                        label: c.header.clone(),
                        value: c.render_cell(row),
                    })
                    .collect(),
            })
            .collect()
    }

    /// Draw the table into `area`.
    ///
    /// The layout is chosen from the width of `area` against `breakpoint`.
    pub fn render(&self, frame: &mut Frame, area: Rect, breakpoint: u16) {
        let mode = LayoutMode::for_width(area.width, breakpoint);
        let pagination = self.pagination.and_then(pagination_line);

        let (body, footer) = if pagination.is_some() {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(1), Constraint::Length(1)])
                .split(area);
            (chunks[0], Some(chunks[1]))
        } else {
            (area, None)
        };

        match self.view(mode) {
            TableView::Loading => render_placeholder(frame, body, LOADING_MESSAGE, Color::DarkGray),
            TableView::Error(text) => render_placeholder(frame, body, &text, Color::Red),
            TableView::Wide(table) => match self.empty_message {
                Some(message) if table.rows.is_empty() => {
                    render_placeholder(frame, body, message, Color::DarkGray)
                }
                _ => self.render_wide(frame, body, &table),
            },
            TableView::Narrow(cards) => match self.empty_message {
                Some(message) if cards.is_empty() => {
                    render_placeholder(frame, body, message, Color::DarkGray)
                }
                _ => self.render_narrow(frame, body, &cards),
            },
        }

        if let (Some(line), Some(footer)) = (pagination, footer) {
            frame.render_widget(line, footer);
        }
    }

    fn render_wide(&self, frame: &mut Frame, area: Rect, table: &WideTable) {
        let header_style = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD);

        let mut header: Vec<Line> = Vec::new();
        if let Some(check) = table.header_check {
            header.push(Line::from(check.symbol()));
        }
        header.extend(
            table
                .headers
                .iter()
                .zip(&table.attrs)
                .map(|(h, attrs)| Line::from(h.clone()).alignment(attrs.align)),
        );

        let rows: Vec<Row> = table
            .rows
            .iter()
            .map(|row| {
                let mut cells: Vec<Line> = Vec::new();
                if let Some(selected) = row.selected {
                    cells.push(Line::styled(
                        row_checkbox(selected),
                        checkbox_style(selected),
                    ));
                }
                cells.extend(row.cells.iter().zip(&table.attrs).map(|(value, attrs)| {
                    Line::styled(value.clone(), attrs.style).alignment(attrs.align)
                }));
                Row::new(cells)
            })
            .collect();

        let mut widths = Vec::with_capacity(table.headers.len() + 1);
        if table.header_check.is_some() {
            widths.push(Constraint::Length(3));
        }
        widths.extend(table.headers.iter().map(|_| Constraint::Fill(1)));

        let widget = Table::new(rows, widths)
            .header(Row::new(header).style(header_style).bottom_margin(1))
            .column_spacing(2)
            .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
            .highlight_symbol("> ");

        let mut state = TableState::default().with_selected(self.focused_row);
        frame.render_stateful_widget(widget, area, &mut state);
    }

    fn render_narrow(&self, frame: &mut Frame, area: Rect, cards: &[Card]) {
        let label_style = Style::default().add_modifier(Modifier::BOLD);
        let mut lines: Vec<Line> = Vec::new();
        let mut focused_start = 0usize;
        let mut focused_end = 0usize;

        for (index, card) in cards.iter().enumerate() {
            let focused = self.focused_row == Some(index);
            if focused {
                focused_start = lines.len();
            }

            let mut title = Vec::new();
            title.push(Span::raw(if focused { "> " } else { "  " }));
            if let Some(selected) = card.selected {
                title.push(Span::styled(row_checkbox(selected), checkbox_style(selected)));
                title.push(Span::raw(" "));
            }
            title.push(Span::styled(
                card.title.clone().unwrap_or_default(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ));
            let title_line = Line::from(title);
            lines.push(if focused {
                title_line.style(Style::default().bg(Color::DarkGray))
            } else {
                title_line
            });

            for field in &card.fields {
                lines.push(Line::from(vec![
                    Span::raw("    "),
                    Span::styled(format!("{}:", field.label), label_style),
                    Span::raw(" "),
                    Span::raw(field.value.clone()),
                ]));
            }
            if focused {
                focused_end = lines.len();
            }
            lines.push(Line::raw(""));
        }

        let height = area.height as usize;
        let scroll = if focused_end > height {
            focused_end.saturating_sub(height).min(focused_start)
        } else {
            0
        };

        let paragraph = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((scroll as u16, 0));
        frame.render_widget(paragraph, area);
    }
}

fn checkbox_style(selected: bool) -> Style {
    if selected {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    }
}

fn render_placeholder(frame: &mut Frame, area: Rect, text: &str, color: Color) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Min(1),
            Constraint::Percentage(40),
        ])
        .split(area);
    let paragraph = Paragraph::new(text.to_string())
        .style(Style::default().fg(color))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    #[derive(Debug)]
    struct Movement {
        id: String,
        description: String,
        category: String,
        amount: i64,
    }

    impl Identifiable for Movement {
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn movement(id: &str, description: &str, amount: i64) -> Movement {
        Movement {
            id: id.to_string(),
            description: description.to_string(),
            category: "CLEANING".to_string(),
            amount,
        }
    }

    fn columns<'a>() -> Vec<Column<'a, Movement>> {
        vec![
            Column::new("Description", "description", |m: &Movement| {
                m.description.clone()
            })
            .mobile_header(),
            Column::new("Category", "category", |m: &Movement| m.category.clone()),
            Column::new("Amount", "amount", |m: &Movement| m.amount.to_string()).align_right(),
        ]
    }

    fn data() -> Vec<Movement> {
        vec![
            movement("m1", "Towels", 1500),
            movement("m2", "Deep clean", 12000),
            movement("m3", "Keys", 800),
        ]
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        let mut text = String::new();
        for row in buffer.content().chunks(width) {
            for cell in row {
                text.push_str(cell.symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_layout_mode_for_width() {
        assert_eq!(LayoutMode::for_width(120, 100), LayoutMode::Wide);
        assert_eq!(LayoutMode::for_width(100, 100), LayoutMode::Wide);
        assert_eq!(LayoutMode::for_width(99, 100), LayoutMode::Narrow);
    }

    #[test]
    fn test_loading_hides_rows() {
        let columns = columns();
        let data = data();
        let table = DataTable::new(&columns, &data)
            .loading(true)
            .error(Some("boom"));
        assert_eq!(table.view(LayoutMode::Wide), TableView::Loading);
        assert_eq!(table.view(LayoutMode::Narrow), TableView::Loading);
    }

    #[test]
    fn test_error_takes_precedence_over_rows() {
        let columns = columns();
        let data = data();
        let table = DataTable::new(&columns, &data).error(Some("Request failed"));
        assert_eq!(
            table.view(LayoutMode::Wide),
            TableView::Error("Request failed".to_string())
        );
        assert_eq!(
            table.view(LayoutMode::Narrow),
            TableView::Error("Request failed".to_string())
        );
    }

    #[test]
    fn test_empty_error_string_renders_rows() {
        let columns = columns();
        let data = data();
        let table = DataTable::new(&columns, &data).error(Some(""));
        assert!(matches!(table.view(LayoutMode::Wide), TableView::Wide(_)));
    }

    #[test]
    fn test_wide_rows_in_input_order() {
        let columns = columns();
        let data = data();
        let TableView::Wide(table) = DataTable::new(&columns, &data).view(LayoutMode::Wide) else {
            panic!("expected wide view");
        };
        assert_eq!(table.headers, vec!["Description", "Category", "Amount"]);
        assert_eq!(table.header_check, None);
        let ids: Vec<&str> = table.rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2", "m3"]);
        assert_eq!(table.rows[1].cells, vec!["Deep clean", "CLEANING", "12000"]);
        assert_eq!(table.rows[0].selected, None);
        assert_eq!(table.attrs[2].align, Alignment::Right);
    }

    #[test]
    fn test_wide_selection_checkboxes() {
        let columns = columns();
        let data = data();
        let selected = vec!["m2".to_string()];
        let TableView::Wide(table) = DataTable::new(&columns, &data)
            .selection(&selected)
            .view(LayoutMode::Wide)
        else {
            panic!("expected wide view");
        };
        assert_eq!(table.header_check, Some(HeaderCheck::Partial));
        let checks: Vec<Option<bool>> = table.rows.iter().map(|r| r.selected).collect();
        assert_eq!(checks, vec![Some(false), Some(true), Some(false)]);
    }

    #[test]
    fn test_header_check_all_selected() {
        let columns = columns();
        let data = data();
        let selected: Vec<String> = data.iter().map(|m| m.id.clone()).collect();
        let TableView::Wide(table) = DataTable::new(&columns, &data)
            .selection(&selected)
            .view(LayoutMode::Wide)
        else {
            panic!("expected wide view");
        };
        assert_eq!(table.header_check, Some(HeaderCheck::Checked));
    }

    #[test]
    fn test_narrow_header_column_excluded_from_fields() {
        let columns = columns();
        let data = data();
        let TableView::Narrow(cards) = DataTable::new(&columns, &data).view(LayoutMode::Narrow)
        else {
            panic!("expected narrow view");
        };
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].title.as_deref(), Some("Towels"));
        let labels: Vec<&str> = cards[0].fields.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["Category", "Amount"]);
    }

    #[test]
    fn test_narrow_without_header_column() {
        let columns = vec![
            Column::new("Category", "category", |m: &Movement| m.category.clone()),
            Column::new("Amount", "amount", |m: &Movement| m.amount.to_string()),
        ];
        let data = data();
        let TableView::Narrow(cards) = DataTable::new(&columns, &data).view(LayoutMode::Narrow)
        else {
            panic!("expected narrow view");
        };
        assert!(cards.iter().all(|c| c.title.is_none()));
        assert_eq!(cards[0].fields.len(), 2);
    }

    #[test]
    fn test_narrow_first_flagged_header_wins() {
        let columns = vec![
            Column::new("Category", "category", |m: &Movement| m.category.clone()).mobile_header(),
            Column::new("Description", "description", |m: &Movement| m.description.clone())
                .mobile_header(),
            Column::new("Amount", "amount", |m: &Movement| m.amount.to_string()),
        ];
        let data = data();
        let TableView::Narrow(cards) = DataTable::new(&columns, &data).view(LayoutMode::Narrow)
        else {
            panic!("expected narrow view");
        };
        assert_eq!(cards[0].title.as_deref(), Some("CLEANING"));
        let labels: Vec<&str> = cards[0].fields.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["Amount"]);
    }

    #[test]
    fn test_render_wide_draws_headers_and_rows() {
        let columns = columns();
        let data = data();
        let backend = TestBackend::new(120, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| {
                DataTable::new(&columns, &data).render(frame, frame.area(), 100);
            })
            .unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("Description"));
        assert!(text.contains("Deep clean"));
    }

    #[test]
    fn test_render_narrow_draws_cards() {
        let columns = columns();
        let data = data();
        let backend = TestBackend::new(40, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| {
                DataTable::new(&columns, &data).render(frame, frame.area(), 100);
            })
            .unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("Towels"));
        assert!(text.contains("Category:"));
        assert!(!text.contains("Description:"));
    }

    #[test]
    fn test_render_loading_message_without_rows() {
        let columns = columns();
        let data = data();
        let backend = TestBackend::new(120, 10);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| {
                DataTable::new(&columns, &data)
                    .loading(true)
                    .render(frame, frame.area(), 100);
            })
            .unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains(LOADING_MESSAGE));
        assert!(!text.contains("Towels"));
    }

    #[test]
    fn test_render_pagination_footer() {
        let columns = columns();
        let data = data();
        let backend = TestBackend::new(120, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| {
                DataTable::new(&columns, &data)
                    .pagination(Some(PaginationState::new(1, 10)))
                    .render(frame, frame.area(), 100);
            })
            .unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("Next ›"));
        assert!(text.contains("…"));
    }

    #[test]
    fn test_empty_page_keeps_pagination_footer() {
        let columns = columns();
        let data: Vec<Movement> = Vec::new();
        for width in [120, 40] {
            let mut terminal = Terminal::new(TestBackend::new(width, 10)).unwrap();
            terminal
                .draw(|frame| {
                    DataTable::new(&columns, &data)
                        .pagination(Some(PaginationState::new(2, 2)))
                        .empty_message("No movements recorded.")
                        .render(frame, frame.area(), 100);
                })
                .unwrap();
            let text = buffer_text(&terminal);
            assert!(text.contains("No movements recorded."));
            assert!(text.contains("Prev"));
        }
    }
}
