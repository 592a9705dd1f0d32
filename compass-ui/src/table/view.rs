//! Render model produced by [`DataTable`](super::DataTable) on every change.

use super::column::Cell;
use super::pager::PageControl;

/// Sort direction of the active sort column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// The opposite direction.
    pub fn toggle(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Cosmetic class names handed through to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableClasses {
    pub table: String,
    pub wrapper: String,
    pub header: String,
}

impl Default for TableClasses {
    fn default() -> Self {
        Self {
            table: "table".to_string(),
            wrapper: "simple-table".to_string(),
            header: "table-light".to_string(),
        }
    }
}

/// One header cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub key: String,
    pub label: String,
    pub sortable: bool,
    /// Set on the column currently sorted.
    pub sorted: Option<SortDirection>,
    pub width: Option<String>,
}

/// Everything the host needs to draw the table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableView {
    pub classes: TableClasses,
    pub header: Vec<HeaderCell>,
    /// Cells of the rows on the current page, one inner vec per row.
    pub rows: Vec<Vec<Cell>>,
    /// Summary text, `None` when written to an external info target.
    pub info: Option<String>,
    /// Page controls, `None` when written to an external pagination target.
    pub pagination: Option<Vec<PageControl>>,
}

impl TableView {
    /// Text of one column across the rendered rows.
    pub fn column_text(&self, index: usize) -> Vec<&str> {
        self.rows
            .iter()
            .filter_map(|cells| cells.get(index).map(Cell::as_str))
            .collect()
    }
}
