//! Column descriptors and the row identity trait.

use ratatui::{layout::Alignment, style::Style};

/// A row that can be displayed by the data table.
///
/// The id is used for keying and selection and must be unique within a
/// single data slice.
pub trait Identifiable {
    /// The unique identifier of this row.
    fn id(&self) -> &str;
}

/// Presentation attributes applied to every cell of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellAttrs {
    /// Horizontal alignment of the cell content.
    pub align: Alignment,
    /// Style applied to the cell content.
    pub style: Style,
}

impl Default for CellAttrs {
    fn default() -> Self {
        Self {
            align: Alignment::Left,
            style: Style::default(),
        }
    }
}

/// Options that only apply to the narrow (card) layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MobileOptions {
    /// Whether this column supplies the card title.
    pub is_header: bool,
}

/// Describes how one field of a row is labeled and displayed.
pub struct Column<'a, T> {
    /// Column header label.
    pub header: String,
    /// Key identifying the column. Not used to look up values.
    pub accessor_key: String,
    /// Produces the displayable content for a row.
    pub render: Box<dyn Fn(&T) -> String + 'a>,
    /// Optional per-cell presentation.
    pub cell: Option<CellAttrs>,
    /// Optional narrow layout options.
    pub mobile: Option<MobileOptions>,
}

impl<'a, T> Column<'a, T> {
    /// Create a new column descriptor.
    pub fn new(
        header: impl Into<String>,
        accessor_key: impl Into<String>,
        render: impl Fn(&T) -> String + 'a,
    ) -> Self {
        Self {
            header: header.into(),
            accessor_key: accessor_key.into(),
            render: Box::new(render),
            cell: None,
            mobile: None,
        }
    }

    /// Right-align cell content (numbers, amounts).
    pub fn align_right(mut self) -> Self {
        let mut cell = self.cell.unwrap_or_default();
        cell.align = Alignment::Right;
        self.cell = Some(cell);
        self
    }

    /// Apply a style to every cell of this column.
    pub fn style(mut self, style: Style) -> Self {
        let mut cell = self.cell.unwrap_or_default();
        cell.style = style;
        self.cell = Some(cell);
        self
    }

    /// Mark this column as the card title in the narrow layout.
    pub fn mobile_header(mut self) -> Self {
        self.mobile = Some(MobileOptions { is_header: true });
        self
    }

    /// Whether this column is flagged as the narrow layout header.
    pub fn is_mobile_header(&self) -> bool {
        self.mobile.map(|m| m.is_header).unwrap_or(false)
    }

    /// Render the cell content for a row.
    pub fn render_cell(&self, row: &T) -> String {
        (self.render)(row)
    }

    /// Effective cell attributes.
    pub fn attrs(&self) -> CellAttrs {
        self.cell.unwrap_or_default()
    }
}

impl<T> std::fmt::Debug for Column<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column")
            .field("header", &self.header)
            .field("accessor_key", &self.accessor_key)
            .field("cell", &self.cell)
            .field("mobile", &self.mobile)
            .finish_non_exhaustive()
    }
}
