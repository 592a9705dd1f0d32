//! Multi-step wizard engine.
//!
//! A [`Stepper`] owns a [`StepContainer`] and moves a 1-based `current`
//! step through it. Unforced moves pass through two gates, the
//! before-change hook and the validator, in that order. Committed moves
//! update the container's state classes, visibility, nav buttons and
//! counter, then fire `on_change` followed by `on_after_step_change`.
//!
//! ```
//! use compass_ui::stepper::{StepContainer, StepNode, Stepper, StepperConfig};
//!
//! let container = StepContainer::anonymous()
//!     .step(StepNode::new("Details"))
//!     .step(StepNode::new("Items"));
//! let mut stepper = Stepper::new(container, StepperConfig::new()).unwrap();
//! assert!(stepper.next().succeeded());
//! assert_eq!(stepper.current(), 2);
//! ```

mod config;
mod container;
mod controls;
mod registry;

pub use config::{StepCallback, StepClasses, StepGate, StepperConfig};
pub use container::{ClassList, ContainerId, Indicator, NavButton, StepContainer, StepNode};
pub use controls::{
    CONTROL_ATTR, CONTROLS_DELEGATE, ControlAction, ControlActionError, ControlOutcome,
    TARGET_ATTR, dispatch_control, wire_controls,
};
pub use registry::StepperRegistry;

use thiserror::Error;

use crate::panic::guard_hook;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepperError {
    #[error("stepper container {0} has no steps")]
    NoSteps(ContainerId),

    #[error("no stepper container registered as {0}")]
    UnknownContainer(String),

    #[error("stepper {0} is already live")]
    AlreadyLive(ContainerId),
}

/// The hook that vetoed a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    BeforeChange,
    Validator,
}

/// Outcome of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// `current` moved from `from` to `to`.
    Committed { from: usize, to: usize },
    /// Target was already current.
    Unchanged,
    /// Target outside `1..=max`.
    OutOfRange { target: usize, max: usize },
    /// A gating hook refused the move.
    Vetoed(Gate),
}

impl Navigation {
    /// Whether the request counts as a success.
    pub fn succeeded(&self) -> bool {
        matches!(self, Navigation::Committed { .. } | Navigation::Unchanged)
    }
}

pub struct Stepper {
    container: StepContainer,
    config: StepperConfig,
    current: usize,
    max_steps: usize,
}

impl Stepper {
    /// Take over `container`.
    ///
    /// The initial step comes from the container's step attribute, falling
    /// back to 1 when absent or out of range.
    pub fn new(container: StepContainer, config: StepperConfig) -> Result<Self, StepperError> {
        let max_steps = container.step_count();
        if max_steps == 0 {
            return Err(StepperError::NoSteps(container.id().clone()));
        }

        let current = match container.persisted_step() {
            Some(step) if (1..=max_steps).contains(&step) => step,
            Some(step) => {
                log::warn!(
                    "Stepper: persisted step {} outside 1..={}, starting at 1",
                    step,
                    max_steps
                );
                1
            }
            None => 1,
        };

        let mut stepper = Self {
            container,
            config,
            current,
            max_steps,
        };
        for indicator in stepper.container.indicators.iter_mut() {
            indicator.listening = indicator.clickable;
        }
        stepper.sync_display();
        Ok(stepper)
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn id(&self) -> &ContainerId {
        self.container.id()
    }

    pub fn container(&self) -> &StepContainer {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut StepContainer {
        &mut self.container
    }

    /// Move to `target`. `force` skips both gating hooks.
    pub fn go_to(&mut self, target: usize, force: bool) -> Navigation {
        if target < 1 || target > self.max_steps {
            log::warn!(
                "Stepper: Invalid step number {}. Must be between 1 and {}",
                target,
                self.max_steps
            );
            return Navigation::OutOfRange {
                target,
                max: self.max_steps,
            };
        }
        if target == self.current {
            return Navigation::Unchanged;
        }

        let from = self.current;
        if !force {
            if let Some(hook) = self.config.on_before_step_change.as_mut()
                && !guard_hook("on_before_step_change", || hook(from, target))
            {
                return Navigation::Vetoed(Gate::BeforeChange);
            }

            let allowed = match self.config.on_validate.as_mut() {
                Some(hook) => guard_hook("on_validate", || hook(from, target)),
                None => validate_departing_step(&self.container, from, target),
            };
            if !allowed {
                return Navigation::Vetoed(Gate::Validator);
            }
        }

        self.current = target;
        self.sync_display();

        if let Some(cb) = self.config.on_change.as_mut() {
            cb(from, target);
        }
        if let Some(cb) = self.config.on_after_step_change.as_mut() {
            cb(from, target);
        }
        Navigation::Committed { from, to: target }
    }

    /// Unforced move to `target`.
    pub fn go(&mut self, target: usize) -> Navigation {
        self.go_to(target, false)
    }

    pub fn next(&mut self) -> Navigation {
        self.go_to(self.current + 1, false)
    }

    pub fn prev(&mut self) -> Navigation {
        // 0 is out of range and reported as such
        self.go_to(self.current.saturating_sub(1), false)
    }

    /// Forced move back to step 1.
    pub fn reset(&mut self) -> Navigation {
        self.go_to(1, true)
    }

    /// Mark every step and indicator completed without moving.
    pub fn complete(&mut self) {
        let classes = &self.config.classes;
        let lists = self
            .container
            .steps
            .iter_mut()
            .map(|s| &mut s.classes)
            .chain(self.container.indicators.iter_mut().map(|i| &mut i.classes));
        for list in lists {
            list.add(&classes.completed);
            list.remove(&classes.active);
            list.remove(&classes.error);
        }
    }

    pub fn set_step_error(&mut self, step: usize) {
        self.toggle_error(step, true);
    }

    pub fn clear_step_error(&mut self, step: usize) {
        self.toggle_error(step, false);
    }

    /// Handle a click on the indicator for `step`.
    ///
    /// Returns `None` when no listener is attached to that indicator.
    pub fn click_indicator(&mut self, step: usize) -> Option<Navigation> {
        let listening = self
            .container
            .indicator_node(step)
            .is_some_and(Indicator::is_listening);
        listening.then(|| self.go_to(step, false))
    }

    /// Detach indicator listeners and hand the container back.
    pub fn destroy(mut self) -> StepContainer {
        for indicator in self.container.indicators.iter_mut() {
            indicator.listening = false;
        }
        self.container
    }

    fn toggle_error(&mut self, step: usize, on: bool) {
        let Some(index) = step.checked_sub(1) else {
            return;
        };
        let error = &self.config.classes.error;
        if let Some(node) = self.container.steps.get_mut(index) {
            node.classes.toggle(error, on);
        }
        if let Some(indicator) = self.container.indicators.get_mut(index) {
            indicator.classes.toggle(error, on);
        }
    }

    fn sync_display(&mut self) {
        let current = self.current;
        let max = self.max_steps;
        let classes = &self.config.classes;

        for (index, node) in self.container.steps.iter_mut().enumerate() {
            let number = index + 1;
            mark(&mut node.classes, classes, number, current);
            node.visible = number == current;
        }
        for (index, indicator) in self.container.indicators.iter_mut().enumerate() {
            mark(&mut indicator.classes, classes, index + 1, current);
        }

        if let Some(button) = self.container.prev_button.as_mut() {
            button.disabled = current <= 1;
            button.classes.toggle(&classes.disabled, button.disabled);
        }
        if let Some(button) = self.container.next_button.as_mut() {
            button.disabled = current >= max;
            button.classes.toggle(&classes.disabled, button.disabled);
        }
        if let Some(counter) = self.container.counter.as_mut() {
            *counter = format!("{}/{}", current, max);
        }
        self.container.step_attr = Some(current.to_string());
    }
}

impl std::fmt::Debug for Stepper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stepper")
            .field("id", self.container.id())
            .field("current", &self.current)
            .field("max_steps", &self.max_steps)
            .finish()
    }
}

fn mark(list: &mut ClassList, classes: &StepClasses, number: usize, current: usize) {
    list.remove(&classes.active);
    list.remove(&classes.completed);
    list.remove(&classes.error);
    if number == current {
        list.add(&classes.active);
    } else if number < current {
        list.add(&classes.completed);
    }
}

/// Forward moves check the departing step's form; other moves pass.
fn validate_departing_step(container: &StepContainer, from: usize, to: usize) -> bool {
    if to <= from {
        return true;
    }
    match container.step_node(from).and_then(|s| s.form.as_ref()) {
        Some(form) => form.check_validity().is_valid(),
        None => true,
    }
}
