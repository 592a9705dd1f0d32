pub mod events;
pub mod form;
pub mod panic;
pub mod stepper;
pub mod table;
pub mod validation;

pub mod prelude {
    pub use crate::events::{Click, ClickSource, EventBus};
    pub use crate::form::{Field, FieldKind, Form};
    pub use crate::stepper::{
        ContainerId, Indicator, Navigation, StepContainer, StepNode, Stepper, StepperConfig,
        StepperRegistry, wire_controls,
    };
    pub use crate::table::{Cell, Column, DataTable, Row, TableConfig, TableHost, TableView};
    pub use crate::validation::{Validatable, ValidationResult, Validator};
}
