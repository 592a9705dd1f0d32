//! DataTable - an in-memory table with search, sort and pagination.
//!
//! The table owns the full row set and derives the visible subset from three
//! inputs only: the loaded rows, the filter text and the sort state. Every
//! mutating call re-derives, clamps the current page and pushes a fresh
//! [`TableView`] to the host (and to external info/pagination targets when
//! configured).
//!
//! # Example
//!
//! ```
//! use compass_ui::table::{Column, DataTable, Row, SharedView, TableConfig};
//!
//! let host = SharedView::new();
//! let mut table = DataTable::new(
//!     host.clone(),
//!     vec![Column::new("controlId", "Control ID").sortable()],
//!     TableConfig::default().page_size(2),
//! );
//! table.load(vec![
//!     Row::new().with("controlId", "B"),
//!     Row::new().with("controlId", "A"),
//! ]);
//! table.sort_by("controlId");
//! assert_eq!(host.get().unwrap().column_text(0), ["A", "B"]);
//! ```

mod column;
mod pager;
mod row;
mod surface;
mod view;

pub use column::{Cell, CellRenderer, Column, TextRenderer};
pub use pager::{NO_DATA, PAGE_RADIUS, PageControl, page_controls, page_count, summary, window};
pub use row::{Row, rows_from_json, value_text};
pub use surface::{
    InfoTarget, PaginationTarget, SharedControls, SharedText, SharedView, TableHost,
};
pub use view::{HeaderCell, SortDirection, TableClasses, TableView};

use serde_json::Value;

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Errors raised when mounting a table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("table container is missing")]
    MissingContainer,
}

/// Active sort column and direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub key: String,
    pub direction: SortDirection,
}

/// Optional construction settings.
pub struct TableConfig {
    page_size: usize,
    classes: TableClasses,
    external_info: Option<Box<dyn InfoTarget>>,
    external_pagination: Option<Box<dyn PaginationTarget>>,
    on_reset: Option<Box<dyn FnMut()>>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            classes: TableClasses::default(),
            external_info: None,
            external_pagination: None,
            on_reset: None,
        }
    }
}

impl TableConfig {
    /// Rows per page (zero is treated as one).
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn table_class(mut self, class: impl Into<String>) -> Self {
        self.classes.table = class.into();
        self
    }

    pub fn wrapper_class(mut self, class: impl Into<String>) -> Self {
        self.classes.wrapper = class.into();
        self
    }

    pub fn header_class(mut self, class: impl Into<String>) -> Self {
        self.classes.header = class.into();
        self
    }

    /// Write summary text to `target` instead of the internal footer.
    pub fn external_info(mut self, target: impl InfoTarget + 'static) -> Self {
        self.external_info = Some(Box::new(target));
        self
    }

    /// Write page controls to `target` instead of the internal footer.
    pub fn external_pagination(mut self, target: impl PaginationTarget + 'static) -> Self {
        self.external_pagination = Some(Box::new(target));
        self
    }

    /// Called on every `load`, so the caller can clear its search input.
    pub fn on_reset(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_reset = Some(Box::new(f));
        self
    }
}

/// A searchable, sortable, paginated table.
pub struct DataTable {
    host: Box<dyn TableHost>,
    columns: Vec<Column>,
    classes: TableClasses,
    external_info: Option<Box<dyn InfoTarget>>,
    external_pagination: Option<Box<dyn PaginationTarget>>,
    on_reset: Option<Box<dyn FnMut()>>,

    data: Vec<Row>,
    /// Indices into `data`, filtered then sorted.
    filtered: Vec<usize>,
    query: String,
    sort: Option<Sort>,
    current_page: usize,
    page_size: usize,

    view: TableView,
}

impl DataTable {
    /// Mount a table in `host` and render the empty state.
    pub fn new(host: impl TableHost + 'static, columns: Vec<Column>, config: TableConfig) -> Self {
        let mut table = Self {
            host: Box::new(host),
            columns,
            classes: config.classes,
            external_info: config.external_info,
            external_pagination: config.external_pagination,
            on_reset: config.on_reset,
            data: Vec::new(),
            filtered: Vec::new(),
            query: String::new(),
            sort: None,
            current_page: 1,
            page_size: config.page_size.max(1),
            view: TableView::default(),
        };
        table.render();
        table
    }

    /// Mount a table in a container that may be absent.
    ///
    /// Fails fast instead of producing a table that renders nowhere.
    pub fn attach<H: TableHost + 'static>(
        host: Option<H>,
        columns: Vec<Column>,
        config: TableConfig,
    ) -> Result<Self, TableError> {
        let host = host.ok_or(TableError::MissingContainer)?;
        Ok(Self::new(host, columns, config))
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Replace the row set, resetting filter, sort and page.
    pub fn load(&mut self, rows: Vec<Row>) {
        self.data = rows;
        self.query.clear();
        self.sort = None;
        self.current_page = 1;
        self.derive();
        if let Some(on_reset) = self.on_reset.as_mut() {
            on_reset();
        }
        self.render();
    }

    /// Load from a loosely-shaped JSON payload (see [`rows_from_json`]).
    pub fn load_json(&mut self, value: &Value) {
        self.load(rows_from_json(value));
    }

    /// Keep rows where any field contains `text`, case-insensitively.
    ///
    /// Blank text clears the filter. The active sort is re-applied to the
    /// new subset and the table returns to page 1.
    pub fn filter(&mut self, text: &str) {
        self.query = text.trim().to_lowercase();
        self.current_page = 1;
        self.derive();
        self.render();
    }

    /// Sort by `key`, toggling direction when it is already the sort key.
    ///
    /// The current page index is kept.
    pub fn sort_by(&mut self, key: &str) {
        self.sort = Some(match self.sort.take() {
            Some(sort) if sort.key == key => Sort {
                key: sort.key,
                direction: sort.direction.toggle(),
            },
            _ => Sort {
                key: key.to_string(),
                direction: SortDirection::Asc,
            },
        });
        self.derive();
        self.render();
    }

    /// Change rows per page and return to page 1.
    pub fn set_page_size(&mut self, page_size: usize) {
        if page_size == 0 {
            log::warn!("DataTable: page size must be positive, using 1");
        }
        self.page_size = page_size.max(1);
        self.current_page = 1;
        self.render();
    }

    /// Jump to a page, clamped into range.
    pub fn go_to_page(&mut self, page: usize) {
        self.current_page = page;
        self.render();
    }

    pub fn next_page(&mut self) {
        self.go_to_page(self.current_page + 1);
    }

    pub fn prev_page(&mut self) {
        self.go_to_page(self.current_page.saturating_sub(1));
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// All rows as last loaded.
    pub fn data(&self) -> &[Row] {
        &self.data
    }

    /// Rows surviving the filter, in display order.
    pub fn filtered_rows(&self) -> Vec<&Row> {
        self.filtered.iter().map(|&i| &self.data[i]).collect()
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    /// Rows on the current page.
    pub fn visible_rows(&self) -> Vec<&Row> {
        let (start, end) = window(self.current_page, self.page_size, self.filtered.len());
        self.filtered[start..end]
            .iter()
            .map(|&i| &self.data[i])
            .collect()
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_count(&self) -> usize {
        page_count(self.filtered.len(), self.page_size)
    }

    pub fn sort(&self) -> Option<&Sort> {
        self.sort.as_ref()
    }

    /// The normalised (trimmed, lowercased) filter text.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The last rendered view.
    pub fn view(&self) -> &TableView {
        &self.view
    }

    // -------------------------------------------------------------------------
    // Derivation and rendering
    // -------------------------------------------------------------------------

    fn derive(&mut self) {
        let mut filtered: Vec<usize> = if self.query.is_empty() {
            (0..self.data.len()).collect()
        } else {
            (0..self.data.len())
                .filter(|&i| self.data[i].matches(&self.query))
                .collect()
        };

        if let Some(sort) = &self.sort {
            let keys: Vec<String> = self
                .data
                .iter()
                .map(|row| row.text(&sort.key).to_lowercase())
                .collect();
            // sort_by is stable, ties keep load order in both directions
            filtered.sort_by(|&a, &b| {
                let ord = keys[a].cmp(&keys[b]);
                match sort.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }

        self.filtered = filtered;
    }

    fn render(&mut self) {
        let total = self.filtered.len();
        let pages = page_count(total, self.page_size);
        self.current_page = self.current_page.clamp(1, pages);

        let (start, end) = window(self.current_page, self.page_size, total);
        let rows: Vec<Vec<Cell>> = self.filtered[start..end]
            .iter()
            .map(|&i| {
                let row = &self.data[i];
                self.columns.iter().map(|col| col.cell(row)).collect::<Vec<_>>()
            })
            .collect();

        let header: Vec<HeaderCell> = self
            .columns
            .iter()
            .map(|col| HeaderCell {
                key: col.key.clone(),
                label: col.label.clone(),
                sortable: col.sortable,
                sorted: self
                    .sort
                    .as_ref()
                    .filter(|sort| sort.key == col.key)
                    .map(|sort| sort.direction),
                width: col.width.clone(),
            })
            .collect();

        let info = summary(start, end, total);
        let controls = page_controls(self.current_page, pages);

        let info = match self.external_info.as_mut() {
            Some(target) => {
                target.set_info(&info);
                None
            }
            None => Some(info),
        };
        let pagination = match self.external_pagination.as_mut() {
            Some(target) => {
                target.set_controls(&controls);
                None
            }
            None => Some(controls),
        };

        self.view = TableView {
            classes: self.classes.clone(),
            header,
            rows,
            info,
            pagination,
        };
        self.host.render(&self.view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(ids: &[&str]) -> Vec<Row> {
        ids.iter().map(|id| Row::new().with("id", *id)).collect()
    }

    fn table(page_size: usize) -> (DataTable, SharedView) {
        let host = SharedView::new();
        let table = DataTable::new(
            host.clone(),
            vec![Column::new("id", "ID").sortable()],
            TableConfig::default().page_size(page_size),
        );
        (table, host)
    }

    #[test]
    fn test_empty_table_renders_no_data() {
        let (table, host) = table(10);
        let view = host.get().unwrap();
        assert!(view.rows.is_empty());
        assert_eq!(view.info.as_deref(), Some("No data"));
        assert_eq!(view.pagination, Some(Vec::new()));
        assert_eq!(table.page_count(), 1);
    }

    #[test]
    fn test_attach_without_container_fails() {
        let result = DataTable::attach::<SharedView>(None, Vec::new(), TableConfig::default());
        assert_eq!(result.err(), Some(TableError::MissingContainer));
    }

    #[test]
    fn test_out_of_range_page_is_clamped() {
        let (mut table, _) = table(2);
        table.load(rows(&["a", "b", "c"]));
        table.go_to_page(99);
        assert_eq!(table.current_page(), 2);
        table.go_to_page(0);
        assert_eq!(table.current_page(), 1);
    }

    #[test]
    fn test_filter_shrinking_result_clamps_page() {
        let (mut table, _) = table(1);
        table.load(rows(&["a", "b", "c"]));
        table.go_to_page(3);
        table.filter("a");
        assert_eq!(table.current_page(), 1);
        assert_eq!(table.filtered_len(), 1);
    }

    #[test]
    fn test_zero_page_size_is_one() {
        let (mut table, _) = table(5);
        table.load(rows(&["a", "b"]));
        table.set_page_size(0);
        assert_eq!(table.page_size(), 1);
        assert_eq!(table.page_count(), 2);
    }

    #[test]
    fn test_header_marks_sorted_column() {
        let (mut table, host) = table(10);
        table.load(rows(&["b", "a"]));
        table.sort_by("id");
        assert_eq!(
            host.get().unwrap().header[0].sorted,
            Some(SortDirection::Asc)
        );
        table.sort_by("id");
        assert_eq!(
            host.get().unwrap().header[0].sorted,
            Some(SortDirection::Desc)
        );
    }

    #[test]
    fn test_sort_by_new_key_resets_to_asc() {
        let (mut table, _) = table(10);
        table.load(rows(&["b", "a"]));
        table.sort_by("id");
        table.sort_by("id");
        table.sort_by("other");
        let sort = table.sort().unwrap();
        assert_eq!(sort.key, "other");
        assert_eq!(sort.direction, SortDirection::Asc);
    }
}
