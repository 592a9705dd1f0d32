//! Error types

mod api;
mod template;
mod validation;

pub use api::*;
pub use template::*;
pub use validation::*;

/// Top-level error returned by client and service calls.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Request failed at the API boundary.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Input rejected before any request was made.
    #[error("{}", join_messages(.0))]
    Validation(Vec<FieldValidationError>),

    /// Template file could not be accepted or read.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// A control item with this ID already exists in the framework.
    #[error("Control ID \"{0}\" already exists in this framework")]
    Duplicate(String),
}

impl Error {
    /// Returns `true` if the request was cancelled rather than failed.
    ///
    /// Callers treat this as "ignore", never as an error to display.
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Api(ApiError::Aborted))
    }

    /// Creates a validation error for a single field.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldValidationError::new(field, message)])
    }
}

fn join_messages(errors: &[FieldValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
