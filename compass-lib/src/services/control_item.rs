use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::ApiClient;
use crate::error::{Error, FieldValidationError};
use crate::model::{BulkAddResult, BulkItemError, ControlField, ControlItem, ControlItemUpdate};

/// Sort direction for control listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Search, filter and ordering options for [`ControlItemService::get_control_items`].
#[derive(Debug, Clone, Default)]
pub struct ControlQuery {
    /// Case-insensitive text matched against id, category and description.
    pub search: Option<String>,
    /// Exact category; `all` means no filter.
    pub category: Option<String>,
    pub sort_by: ControlField,
    pub order: SortOrder,
    /// Cancels the underlying fetch.
    pub signal: Option<CancellationToken>,
}

impl ControlQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn sort(mut self, field: ControlField, order: SortOrder) -> Self {
        self.sort_by = field;
        self.order = order;
        self
    }

    pub fn signal(mut self, token: CancellationToken) -> Self {
        self.signal = Some(token);
        self
    }

    /// Apply search, category filter and ordering to `items`.
    pub fn apply(&self, mut items: Vec<ControlItem>) -> Vec<ControlItem> {
        if let Some(term) = self.search.as_deref().filter(|s| !s.is_empty()) {
            let term = term.to_lowercase();
            items.retain(|c| {
                [
                    &c.control_id,
                    &c.control_category,
                    &c.control_description,
                ]
                .iter()
                .any(|v| v.to_lowercase().contains(&term))
            });
        }

        if let Some(category) = self
            .category
            .as_deref()
            .filter(|c| !c.is_empty() && *c != "all")
        {
            items.retain(|c| c.control_category == category);
        }

        items.sort_by(|a, b| {
            let ord = natural_cmp(a.field(self.sort_by), b.field(self.sort_by));
            match self.order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });
        items
    }
}

/// Control item listing and maintenance.
#[derive(Debug, Clone)]
pub struct ControlItemService {
    api: ApiClient,
}

impl ControlItemService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Control items of a framework, searched, filtered and sorted.
    pub async fn get_control_items(
        &self,
        framework_id: &str,
        query: &ControlQuery,
    ) -> Result<Vec<ControlItem>, Error> {
        let items = self
            .api
            .get_framework_rows(framework_id, query.signal.as_ref())
            .await?;
        Ok(query.apply(items))
    }

    /// Validate and add a control item, rejecting duplicate ids.
    pub async fn add_control_item(&self, framework_id: &str, item: &ControlItem) -> Result<Value, Error> {
        let errors = validate_control_item(item);
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        let item = item.trimmed();
        let existing = self.api.fetch_framework_rows(framework_id).await?;
        if existing.iter().any(|c| c.control_id == item.control_id) {
            return Err(Error::Duplicate(item.control_id));
        }
        self.api.add_control_item(framework_id, &item).await
    }

    pub async fn update_control_item(
        &self,
        framework_id: &str,
        control_id: &str,
        update: &ControlItemUpdate,
    ) -> Result<Value, Error> {
        self.api
            .update_control_item(framework_id, control_id, update)
            .await
    }

    pub async fn delete_control_item(&self, framework_id: &str, control_id: &str) -> Result<Value, Error> {
        self.api.delete_control_item(framework_id, control_id).await
    }

    /// Distinct non-empty categories, sorted.
    pub async fn get_control_categories(&self, framework_id: &str) -> Result<Vec<String>, Error> {
        let items = self.api.fetch_framework_rows(framework_id).await?;
        let categories: BTreeSet<String> = items
            .into_iter()
            .map(|c| c.control_category)
            .filter(|c| !c.is_empty())
            .collect();
        Ok(categories.into_iter().collect())
    }

    /// Add items one by one, collecting successes and per-item failures.
    pub async fn bulk_add_control_items(
        &self,
        framework_id: &str,
        items: Vec<ControlItem>,
    ) -> BulkAddResult {
        let mut outcome = BulkAddResult::default();
        for (index, item) in items.into_iter().enumerate() {
            match self.add_control_item(framework_id, &item).await {
                Ok(result) => outcome.results.push(result),
                Err(error) => outcome.errors.push(BulkItemError { index, item, error }),
            }
        }
        outcome
    }
}

/// Check required fields and the control id character set.
pub fn validate_control_item(item: &ControlItem) -> Vec<FieldValidationError> {
    let mut errors = Vec::new();
    if item.control_id.trim().is_empty() {
        errors.push(FieldValidationError::new("controlId", "Control ID is required"));
    }
    if item.control_category.trim().is_empty() {
        errors.push(FieldValidationError::new(
            "controlCategory",
            "Control Category is required",
        ));
    }
    if item.control_description.trim().is_empty() {
        errors.push(FieldValidationError::new(
            "controlDescription",
            "Control Description is required",
        ));
    }
    if !item.control_id.is_empty() && !item.control_id.chars().all(is_control_id_char) {
        errors.push(FieldValidationError::new(
            "controlId",
            "Control ID contains invalid characters",
        ));
    }
    errors
}

fn is_control_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c.is_whitespace() || matches!(c, '-' | '.' | '_')
}

/// Compare strings so that digit runs order by numeric value.
///
/// `A.2` sorts before `A.10`. Text runs compare case-insensitively, with
/// the raw strings as the final tie-break.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = Chunks::new(a);
    let mut right = Chunks::new(b);
    loop {
        match (left.next(), right.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = match (x, y) {
                    (Chunk::Digits(x), Chunk::Digits(y)) => {
                        let (x, y) = (x.trim_start_matches('0'), y.trim_start_matches('0'));
                        x.len().cmp(&y.len()).then_with(|| x.cmp(y))
                    }
                    (Chunk::Digits(_), Chunk::Text(_)) => Ordering::Less,
                    (Chunk::Text(_), Chunk::Digits(_)) => Ordering::Greater,
                    (Chunk::Text(x), Chunk::Text(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

enum Chunk<'a> {
    Digits(&'a str),
    Text(&'a str),
}

struct Chunks<'a> {
    rest: &'a str,
}

impl<'a> Chunks<'a> {
    fn new(s: &'a str) -> Self {
        Self { rest: s }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.rest.chars().next()?;
        let digits = first.is_ascii_digit();
        let end = self
            .rest
            .find(|c: char| c.is_ascii_digit() != digits)
            .unwrap_or(self.rest.len());
        let (chunk, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(if digits {
            Chunk::Digits(chunk)
        } else {
            Chunk::Text(chunk)
        })
    }
}
