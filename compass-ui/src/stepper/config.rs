use std::fmt;

/// Callback receiving `(from, to)` of a committed transition.
pub type StepCallback = Box<dyn FnMut(usize, usize)>;

/// Gating hook receiving `(from, to)`; returning false vetoes the move.
pub type StepGate = Box<dyn FnMut(usize, usize) -> bool>;

/// State class names applied to steps and indicators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepClasses {
    pub active: String,
    pub completed: String,
    pub error: String,
    pub disabled: String,
}

impl Default for StepClasses {
    fn default() -> Self {
        Self {
            active: "active".to_string(),
            completed: "completed".to_string(),
            error: "error".to_string(),
            disabled: "disabled".to_string(),
        }
    }
}

/// Stepper configuration.
///
/// Every hook is optional. Without `on_validate` the stepper checks the
/// departing step's form on forward moves.
#[derive(Default)]
pub struct StepperConfig {
    pub(crate) on_change: Option<StepCallback>,
    pub(crate) on_validate: Option<StepGate>,
    pub(crate) on_before_step_change: Option<StepGate>,
    pub(crate) on_after_step_change: Option<StepCallback>,
    pub(crate) classes: StepClasses,
}

impl StepperConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_change(mut self, f: impl FnMut(usize, usize) + 'static) -> Self {
        self.on_change = Some(Box::new(f));
        self
    }

    /// Replace the default form validator.
    pub fn on_validate(mut self, f: impl FnMut(usize, usize) -> bool + 'static) -> Self {
        self.on_validate = Some(Box::new(f));
        self
    }

    /// Runs before validation on every unforced transition.
    pub fn on_before_step_change(mut self, f: impl FnMut(usize, usize) -> bool + 'static) -> Self {
        self.on_before_step_change = Some(Box::new(f));
        self
    }

    /// Runs after `on_change`.
    pub fn on_after_step_change(mut self, f: impl FnMut(usize, usize) + 'static) -> Self {
        self.on_after_step_change = Some(Box::new(f));
        self
    }

    pub fn classes(mut self, classes: StepClasses) -> Self {
        self.classes = classes;
        self
    }
}

impl fmt::Debug for StepperConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepperConfig")
            .field("on_change", &self.on_change.is_some())
            .field("on_validate", &self.on_validate.is_some())
            .field("on_before_step_change", &self.on_before_step_change.is_some())
            .field("on_after_step_change", &self.on_after_step_change.is_some())
            .field("classes", &self.classes)
            .finish()
    }
}
