//! Navigation controls living outside a stepper container.
//!
//! A control element declares its action in [`CONTROL_ATTR`] and the
//! container it drives in [`TARGET_ATTR`]. One delegate per click source
//! resolves clicks to live (or lazily created) instances.

use std::cell::RefCell;
use std::rc::Rc;
use std::str::FromStr;

use thiserror::Error;

use super::{ContainerId, Navigation, StepperError, StepperRegistry};
use crate::events::{Click, ClickSource, ListenerId};

/// Attribute naming the control's action.
pub const CONTROL_ATTR: &str = "data-stepper-control";

/// Attribute holding the `#id` selector of the target container.
pub const TARGET_ATTR: &str = "data-stepper-target";

/// Delegate name under which the controls listener is installed.
pub const CONTROLS_DELEGATE: &str = "stepper-controls";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlActionError {
    #[error("unknown stepper action: {0}")]
    Unknown(String),

    #[error("invalid step number in action: {0}")]
    InvalidStep(String),
}

/// Action a control element invokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    Next,
    Prev,
    Reset,
    Complete,
    Go(usize),
}

impl FromStr for ControlAction {
    type Err = ControlActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "next" => return Ok(ControlAction::Next),
            "prev" => return Ok(ControlAction::Prev),
            "reset" => return Ok(ControlAction::Reset),
            "complete" => return Ok(ControlAction::Complete),
            _ => {}
        }

        let step = s
            .strip_prefix("go:")
            .or_else(|| s.strip_prefix("goto-"))
            .ok_or_else(|| ControlActionError::Unknown(s.to_string()))?;
        step.trim()
            .parse()
            .map(ControlAction::Go)
            .map_err(|_| ControlActionError::InvalidStep(s.to_string()))
    }
}

/// What a click did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlOutcome {
    /// Nothing on the click path is a control.
    NotAControl,
    /// The control has no target attribute.
    MissingTarget,
    /// The target selector matches no registered container.
    TargetNotFound(String),
    /// The action attribute did not parse.
    InvalidAction(ControlActionError),
    /// The target could not be brought live.
    Unavailable(StepperError),
    Navigated(ContainerId, Navigation),
    Completed(ContainerId),
}

/// Resolve `click` to a control and run its action.
pub fn dispatch_control(registry: &mut StepperRegistry, click: &Click) -> ControlOutcome {
    let Some(attrs) = click.closest(CONTROL_ATTR) else {
        return ControlOutcome::NotAControl;
    };

    let Some(selector) = attrs.get(TARGET_ATTR) else {
        log::warn!("Stepper control button missing {} attribute", TARGET_ATTR);
        return ControlOutcome::MissingTarget;
    };

    let Some(id) = registry.resolve(selector) else {
        log::warn!("Stepper target not found: {}", selector);
        return ControlOutcome::TargetNotFound(selector.clone());
    };

    let action = match attrs
        .get(CONTROL_ATTR)
        .map(String::as_str)
        .unwrap_or_default()
        .parse::<ControlAction>()
    {
        Ok(action) => action,
        Err(e) => {
            log::warn!("Stepper control ignored: {}", e);
            return ControlOutcome::InvalidAction(e);
        }
    };

    let stepper = match registry.acquire(&id) {
        Ok(stepper) => stepper,
        Err(e) => {
            log::warn!("Stepper control target unavailable: {}", e);
            return ControlOutcome::Unavailable(e);
        }
    };

    let navigation = match action {
        ControlAction::Next => stepper.next(),
        ControlAction::Prev => stepper.prev(),
        ControlAction::Reset => stepper.reset(),
        ControlAction::Go(step) => stepper.go(step),
        ControlAction::Complete => {
            stepper.complete();
            return ControlOutcome::Completed(id);
        }
    };
    ControlOutcome::Navigated(id, navigation)
}

/// Install the controls delegate on `source`.
///
/// Returns `None` if the delegate is already installed there.
pub fn wire_controls(
    source: &mut dyn ClickSource,
    registry: Rc<RefCell<StepperRegistry>>,
) -> Option<ListenerId> {
    source.delegate(
        CONTROLS_DELEGATE,
        Box::new(move |click: &Click| match registry.try_borrow_mut() {
            Ok(mut registry) => {
                dispatch_control(&mut registry, click);
            }
            Err(_) => log::warn!("Stepper registry busy, control click dropped"),
        }),
    )
}
