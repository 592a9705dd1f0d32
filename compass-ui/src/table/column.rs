//! Column definitions and cell rendering strategies.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::row::{Row, value_text};

/// Rendered content of a single cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    /// Plain text, escaped by the host when displayed.
    Text(String),
    /// A pre-formatted fragment supplied by a custom renderer, emitted as-is.
    Markup(String),
}

impl Cell {
    /// Create a text cell.
    pub fn text(text: impl Into<String>) -> Self {
        Cell::Text(text.into())
    }

    /// Create a markup cell.
    pub fn markup(markup: impl Into<String>) -> Self {
        Cell::Markup(markup.into())
    }

    /// The cell's content regardless of kind.
    pub fn as_str(&self) -> &str {
        match self {
            Cell::Text(s) | Cell::Markup(s) => s,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strategy for turning a row's field into a cell.
///
/// Implementations must be pure with respect to the row.
pub trait CellRenderer: Send + Sync {
    /// Render the value found under the column key (if any) for `row`.
    fn render(&self, value: Option<&Value>, row: &Row) -> Cell;
}

impl<F> CellRenderer for F
where
    F: Fn(Option<&Value>, &Row) -> Cell + Send + Sync,
{
    fn render(&self, value: Option<&Value>, row: &Row) -> Cell {
        self(value, row)
    }
}

/// Default renderer: plain text projection, missing values render empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl CellRenderer for TextRenderer {
    fn render(&self, value: Option<&Value>, _row: &Row) -> Cell {
        Cell::Text(value.map(value_text).unwrap_or_default())
    }
}

/// A table column.
///
/// # Example
///
/// ```
/// use compass_ui::table::{Cell, Column};
///
/// let columns = vec![
///     Column::new("controlId", "Control ID").sortable().width("18%"),
///     Column::new("controlDescription", "Control Description"),
///     Column::new("__actions", "Actions")
///         .render(|_value, row| Cell::markup(format!("[edit {}]", row.text("controlId")))),
/// ];
/// assert!(columns[0].sortable);
/// ```
#[derive(Clone)]
pub struct Column {
    /// Field name read out of each row.
    pub key: String,
    /// Header text.
    pub label: String,
    /// Whether clicking the header sorts by this column.
    pub sortable: bool,
    /// Cosmetic layout hint passed through to the host.
    pub width: Option<String>,
    renderer: Option<Arc<dyn CellRenderer>>,
}

impl Column {
    /// Create a non-sortable text column.
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            sortable: false,
            width: None,
            renderer: None,
        }
    }

    /// Make the column sortable.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Set the width hint.
    pub fn width(mut self, width: impl Into<String>) -> Self {
        self.width = Some(width.into());
        self
    }

    /// Override the default text rendering with a closure.
    pub fn render<F>(self, f: F) -> Self
    where
        F: Fn(Option<&Value>, &Row) -> Cell + Send + Sync + 'static,
    {
        self.renderer(f)
    }

    /// Override the default text rendering with a renderer value.
    pub fn renderer<R: CellRenderer + 'static>(mut self, renderer: R) -> Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    /// Render this column's cell for `row`.
    pub fn cell(&self, row: &Row) -> Cell {
        let value = row.get(&self.key);
        match &self.renderer {
            Some(renderer) => renderer.render(value, row),
            None => TextRenderer.render(value, row),
        }
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("sortable", &self.sortable)
            .field("width", &self.width)
            .field("renderer", &self.renderer.is_some())
            .finish()
    }
}
