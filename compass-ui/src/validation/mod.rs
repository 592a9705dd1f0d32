//! Field validation for step forms.
//!
//! A fluent builder runs synchronous rules over any [`Validatable`] field,
//! records the first failing message on the field and collects the failures.
//!
//! # Example
//!
//! ```
//! use compass_ui::form::Field;
//! use compass_ui::validation::{Validatable, Validator};
//!
//! let name = Field::text("name");
//! let email = Field::email("email").with_value("not-an-address");
//!
//! let result = Validator::new()
//!     .field(&name, "name")
//!     .required("Name is required")
//!     .field(&email, "email")
//!     .email("Please enter a valid email")
//!     .validate();
//!
//! assert_eq!(result.errors().len(), 2);
//! assert!(name.has_error());
//! ```

mod result;
mod validatable;
mod validator;

pub use result::{FieldError, ValidationResult};
pub use validatable::Validatable;
pub use validator::{FieldBuilder, Validator};
