//! Output targets a table renders into.
//!
//! The table owns its mount point outright. Summary text and page controls
//! go to the internal view unless external targets are supplied.

use std::cell::RefCell;
use std::rc::Rc;

use super::pager::PageControl;
use super::view::TableView;

/// The container a table is mounted in.
pub trait TableHost {
    /// Replace the container's contents with `view`.
    fn render(&mut self, view: &TableView);
}

/// An externally owned element receiving the summary text.
pub trait InfoTarget {
    fn set_info(&mut self, text: &str);
}

/// An externally owned element receiving the page controls.
pub trait PaginationTarget {
    fn set_controls(&mut self, controls: &[PageControl]);
}

/// Shared in-memory host that keeps the last rendered view.
#[derive(Debug, Clone, Default)]
pub struct SharedView(Rc<RefCell<Option<TableView>>>);

impl SharedView {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently rendered view.
    pub fn get(&self) -> Option<TableView> {
        self.0.borrow().clone()
    }
}

impl TableHost for SharedView {
    fn render(&mut self, view: &TableView) {
        *self.0.borrow_mut() = Some(view.clone());
    }
}

/// Shared in-memory info target.
#[derive(Debug, Clone, Default)]
pub struct SharedText(Rc<RefCell<String>>);

impl SharedText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> String {
        self.0.borrow().clone()
    }
}

impl InfoTarget for SharedText {
    fn set_info(&mut self, text: &str) {
        *self.0.borrow_mut() = text.to_string();
    }
}

/// Shared in-memory pagination target.
#[derive(Debug, Clone, Default)]
pub struct SharedControls(Rc<RefCell<Vec<PageControl>>>);

impl SharedControls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Vec<PageControl> {
        self.0.borrow().clone()
    }
}

impl PaginationTarget for SharedControls {
    fn set_controls(&mut self, controls: &[PageControl]) {
        *self.0.borrow_mut() = controls.to_vec();
    }
}
