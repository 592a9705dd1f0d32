//! Minimal form model for step validation.
//!
//! Fields carry the constraints a browser form would check natively
//! (required, pattern, email) plus an optional associated error text that
//! becomes visible while the field is invalid.

mod field;

pub use field::{Field, FieldKind};

use std::collections::BTreeMap;

use crate::validation::{ValidationResult, Validator};

const REQUIRED_MESSAGE: &str = "This field is required";
const EMAIL_MESSAGE: &str = "Please enter a valid email address";
const PATTERN_MESSAGE: &str = "Please match the requested format";

/// An ordered set of fields validated together.
#[derive(Debug, Clone, Default)]
pub struct Form {
    name: String,
    fields: Vec<Field>,
}

impl Form {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Set a field's value. Returns false for unknown fields.
    pub fn set_value(&self, name: &str, value: impl Into<String>) -> bool {
        match self.field(name) {
            Some(field) => {
                field.set_value(value);
                true
            }
            None => false,
        }
    }

    pub fn value(&self, name: &str) -> Option<String> {
        self.field(name).map(Field::value)
    }

    /// Snapshot of all values keyed by field name.
    pub fn values(&self) -> BTreeMap<String, String> {
        self.fields
            .iter()
            .map(|f| (f.name().to_string(), f.value()))
            .collect()
    }

    /// Remove invalid markers from every field.
    pub fn clear_errors(&self) {
        for field in &self.fields {
            field.clear_invalid();
        }
    }

    /// Clear values and invalid markers.
    pub fn reset(&self) {
        for field in &self.fields {
            field.set_value("");
            field.clear_invalid();
        }
    }

    /// Check every field's constraints, marking failures.
    pub fn check_validity(&self) -> ValidationResult {
        self.clear_errors();

        let mut validator = Validator::new();
        for field in &self.fields {
            let message = |fallback: &str| field.error_text_value().unwrap_or_else(|| fallback.to_string());

            let mut builder = validator.field(field, field.name());
            if field.is_required() {
                builder = builder.required(message(REQUIRED_MESSAGE));
            }
            if field.kind() == FieldKind::Email {
                builder = builder.email(message(EMAIL_MESSAGE));
            }
            if let Some(pattern) = field.pattern() {
                builder = builder.pattern(&pattern, message(PATTERN_MESSAGE));
            }
            validator = builder.end();
        }
        validator.validate()
    }

    /// Whether every field currently satisfies its constraints.
    pub fn is_valid(&self) -> bool {
        self.check_validity().is_valid()
    }
}
