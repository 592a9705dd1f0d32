//! Validator builder for fluent validation API.

use regex::Regex;

use super::result::{FieldError, ValidationResult};
use super::validatable::Validatable;

/// Type alias for validation rule closures.
type Rule<V> = Box<dyn Fn(&V) -> Result<(), String> + Send + Sync>;

/// Internal representation of a field being validated.
struct FieldEntry {
    name: String,
    field_id: String,
    set_error: Box<dyn Fn(Option<String>) + Send + Sync>,
    validate: Box<dyn Fn() -> Vec<String> + Send + Sync>,
}

/// Builder for validating multiple form fields.
///
/// Every field is checked; the first failing rule's message is stored on the
/// field, and passing fields have any previous error cleared.
pub struct Validator {
    fields: Vec<FieldEntry>,
}

impl Validator {
    /// Create a new validator.
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Add a field to validate.
    pub fn field<W: Validatable + Clone + 'static>(
        self,
        field: &W,
        name: impl Into<String>,
    ) -> FieldBuilder<W> {
        FieldBuilder {
            validator: self,
            field: field.clone(),
            name: name.into(),
            rules: Vec::new(),
        }
    }

    /// Run all validations.
    pub fn validate(self) -> ValidationResult {
        let mut errors = Vec::new();

        for field in &self.fields {
            let field_errors = (field.validate)();
            if let Some(first_error) = field_errors.first() {
                (field.set_error)(Some(first_error.clone()));
                errors.push(FieldError {
                    field_name: field.name.clone(),
                    field_id: field.field_id.clone(),
                    message: first_error.clone(),
                });
            } else {
                (field.set_error)(None);
            }
        }

        if errors.is_empty() {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid(errors)
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for adding validation rules to a single field.
pub struct FieldBuilder<W: Validatable> {
    validator: Validator,
    field: W,
    name: String,
    rules: Vec<Rule<W::Value>>,
}

impl<W: Validatable + Clone + 'static> FieldBuilder<W> {
    /// Add a custom validation rule.
    pub fn rule<F>(mut self, f: F, msg: impl Into<String>) -> Self
    where
        F: Fn(&W::Value) -> bool + Send + Sync + 'static,
    {
        let msg = msg.into();
        self.rules
            .push(Box::new(move |v| if f(v) { Ok(()) } else { Err(msg.clone()) }));
        self
    }

    /// Continue to the next field.
    pub fn field<W2: Validatable + Clone + 'static>(
        self,
        field: &W2,
        name: impl Into<String>,
    ) -> FieldBuilder<W2> {
        self.end().field(field, name)
    }

    /// Finalize and run all validations.
    pub fn validate(self) -> ValidationResult {
        self.end().validate()
    }

    /// Finalize this field and return the validator.
    ///
    /// Useful when fields are added in a loop.
    pub fn end(self) -> Validator {
        let field_id = self.field.field_id();
        let name = self.name;

        let field_for_validate = self.field.clone();
        let field_for_error = self.field;
        let rules = self.rules;

        let validate: Box<dyn Fn() -> Vec<String> + Send + Sync> = Box::new(move || {
            let value = field_for_validate.validation_value();
            rules
                .iter()
                .filter_map(|rule| rule(&value).err())
                .collect()
        });

        let set_error: Box<dyn Fn(Option<String>) + Send + Sync> = Box::new(move |msg| {
            if let Some(msg) = msg {
                field_for_error.set_error(msg);
            } else {
                field_for_error.clear_error();
            }
        });

        let mut validator = self.validator;
        validator.fields.push(FieldEntry {
            name,
            field_id,
            set_error,
            validate,
        });

        validator
    }
}

// Built-in rules for String values
impl<W: Validatable<Value = String> + Clone + 'static> FieldBuilder<W> {
    /// Require the field to be non-empty.
    ///
    /// Whitespace counts as a value, as with a native `required` input.
    pub fn required(self, msg: impl Into<String>) -> Self {
        self.rule(|v| !v.is_empty(), msg)
    }

    /// Require the value to match a compiled pattern.
    ///
    /// Empty values pass; use `required()` for non-empty.
    pub fn pattern(self, re: &Regex, msg: impl Into<String>) -> Self {
        let re = re.clone();
        self.rule(move |v| v.is_empty() || re.is_match(v), msg)
    }

    /// Require a valid email address.
    pub fn email(self, msg: impl Into<String>) -> Self {
        self.rule(
            |v| {
                if v.is_empty() {
                    true // Empty is valid; use required() for non-empty
                } else {
                    email_address::EmailAddress::is_valid(v)
                }
            },
            msg,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::Field;

    #[test]
    fn test_required_accepts_whitespace() {
        let blank = Field::text("name");
        let spaces = Field::text("shortName").with_value("   ");

        let result = Validator::new()
            .field(&blank, "name")
            .required("Name is required")
            .field(&spaces, "shortName")
            .required("Short name is required")
            .validate();

        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.errors()[0].field_name, "name");
        assert!(blank.has_error());
        assert!(!spaces.has_error());
    }

    #[test]
    fn test_pattern_and_email_skip_empty_values() {
        let re = Regex::new("^[A-Z]+$").unwrap();
        let code = Field::text("code");
        let email = Field::email("email");

        let result = Validator::new()
            .field(&code, "code")
            .pattern(&re, "Upper case only")
            .field(&email, "email")
            .email("Invalid email")
            .validate();
        assert!(result.is_valid());

        code.set_value("abc");
        email.set_value("ops@example.com");
        let result = Validator::new()
            .field(&code, "code")
            .pattern(&re, "Upper case only")
            .field(&email, "email")
            .email("Invalid email")
            .validate();
        assert_eq!(result.errors().len(), 1);
        assert_eq!(code.error().as_deref(), Some("Upper case only"));
    }
}
