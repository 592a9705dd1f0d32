//! Form fields backed by shared state.

use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use regex::Regex;

use crate::validation::Validatable;

/// Input kind, deciding which native constraints apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldKind {
    #[default]
    Text,
    Email,
    File,
}

#[derive(Debug)]
struct FieldInner {
    name: String,
    kind: FieldKind,
    value: String,
    required: bool,
    pattern: Option<Regex>,
    error_text: Option<String>,
    error: Option<String>,
}

/// A single form field.
///
/// Cloning shares the underlying state, so a validator and the form see the
/// same field.
#[derive(Clone)]
pub struct Field {
    inner: Arc<RwLock<FieldInner>>,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            inner: Arc::new(RwLock::new(FieldInner {
                name: name.into(),
                kind,
                value: String::new(),
                required: false,
                pattern: None,
                error_text: None,
                error: None,
            })),
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub fn email(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Email)
    }

    pub fn file(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::File)
    }

    pub fn required(self) -> Self {
        self.write().required = true;
        self
    }

    pub fn with_value(self, value: impl Into<String>) -> Self {
        self.set_value(value);
        self
    }

    /// Constrain the value to match `pattern` in full.
    pub fn with_pattern(self, pattern: &str) -> Result<Self, regex::Error> {
        let re = Regex::new(&format!("^(?:{pattern})$"))?;
        self.write().pattern = Some(re);
        Ok(self)
    }

    /// Associated error text, shown while the field is invalid.
    pub fn error_text(self, text: impl Into<String>) -> Self {
        self.write().error_text = Some(text.into());
        self
    }

    pub fn name(&self) -> String {
        self.read().name.clone()
    }

    pub fn kind(&self) -> FieldKind {
        self.read().kind
    }

    pub fn value(&self) -> String {
        self.read().value.clone()
    }

    pub fn set_value(&self, value: impl Into<String>) {
        self.write().value = value.into();
    }

    pub fn is_required(&self) -> bool {
        self.read().required
    }

    pub fn pattern(&self) -> Option<Regex> {
        self.read().pattern.clone()
    }

    pub fn error_text_value(&self) -> Option<String> {
        self.read().error_text.clone()
    }

    /// Whether the field is currently marked invalid.
    pub fn is_invalid(&self) -> bool {
        self.read().error.is_some()
    }

    /// Whether the associated error text is showing.
    pub fn error_visible(&self) -> bool {
        let inner = self.read();
        inner.error.is_some() && inner.error_text.is_some()
    }

    pub(crate) fn clear_invalid(&self) {
        self.write().error = None;
    }

    fn read(&self) -> RwLockReadGuard<'_, FieldInner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, FieldInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.read();
        f.debug_struct("Field")
            .field("name", &inner.name)
            .field("kind", &inner.kind)
            .field("value", &inner.value)
            .field("error", &inner.error)
            .finish()
    }
}

impl Validatable for Field {
    type Value = String;

    fn validation_value(&self) -> String {
        self.value()
    }

    fn set_error(&self, msg: impl Into<String>) {
        self.write().error = Some(msg.into());
    }

    fn clear_error(&self) {
        self.clear_invalid();
    }

    fn has_error(&self) -> bool {
        self.is_invalid()
    }

    fn error(&self) -> Option<String> {
        self.read().error.clone()
    }

    fn field_id(&self) -> String {
        self.name()
    }
}
