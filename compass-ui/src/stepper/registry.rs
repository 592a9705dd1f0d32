use std::collections::BTreeMap;

use super::{ContainerId, StepContainer, Stepper, StepperConfig, StepperError};

enum Slot {
    Idle(StepContainer),
    Live(Stepper),
}

/// Stepper containers keyed by id, each idle or driven by a live instance.
///
/// Acquiring an idle container creates its instance; releasing destroys the
/// instance and leaves the container to be acquired fresh.
#[derive(Default)]
pub struct StepperRegistry {
    slots: BTreeMap<ContainerId, Slot>,
}

impl StepperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a container. A live instance under the same id is not
    /// replaced.
    pub fn insert(&mut self, container: StepContainer) -> Result<ContainerId, StepperError> {
        let id = container.id().clone();
        if self.is_live(&id) {
            return Err(StepperError::AlreadyLive(id));
        }
        self.slots.insert(id.clone(), Slot::Idle(container));
        Ok(id)
    }

    /// The live instance for `id`, created with the default config if idle.
    pub fn acquire(&mut self, id: &ContainerId) -> Result<&mut Stepper, StepperError> {
        self.acquire_with(id, StepperConfig::default)
    }

    /// The live instance for `id`. `config` is only called when a new
    /// instance has to be created.
    pub fn acquire_with(
        &mut self,
        id: &ContainerId,
        config: impl FnOnce() -> StepperConfig,
    ) -> Result<&mut Stepper, StepperError> {
        let slot = self
            .slots
            .remove(id)
            .ok_or_else(|| StepperError::UnknownContainer(id.to_string()))?;

        let stepper = match slot {
            Slot::Live(stepper) => stepper,
            Slot::Idle(container) if container.step_count() == 0 => {
                self.slots.insert(id.clone(), Slot::Idle(container));
                return Err(StepperError::NoSteps(id.clone()));
            }
            Slot::Idle(container) => Stepper::new(container, config())?,
        };
        self.slots.insert(id.clone(), Slot::Live(stepper));
        self.get_mut(id)
            .ok_or_else(|| StepperError::UnknownContainer(id.to_string()))
    }

    pub fn get(&self, id: &ContainerId) -> Option<&Stepper> {
        match self.slots.get(id)? {
            Slot::Live(stepper) => Some(stepper),
            Slot::Idle(_) => None,
        }
    }

    pub fn get_mut(&mut self, id: &ContainerId) -> Option<&mut Stepper> {
        match self.slots.get_mut(id)? {
            Slot::Live(stepper) => Some(stepper),
            Slot::Idle(_) => None,
        }
    }

    /// Destroy the live instance for `id`. Returns false if none was live.
    pub fn release(&mut self, id: &ContainerId) -> bool {
        match self.slots.remove(id) {
            Some(Slot::Live(stepper)) => {
                self.slots.insert(id.clone(), Slot::Idle(stepper.destroy()));
                true
            }
            Some(idle) => {
                self.slots.insert(id.clone(), idle);
                false
            }
            None => false,
        }
    }

    /// Unregister `id`, destroying any live instance.
    pub fn remove(&mut self, id: &ContainerId) -> Option<StepContainer> {
        match self.slots.remove(id)? {
            Slot::Live(stepper) => Some(stepper.destroy()),
            Slot::Idle(container) => Some(container),
        }
    }

    /// The container for `id`, whether idle or live.
    pub fn container(&self, id: &ContainerId) -> Option<&StepContainer> {
        match self.slots.get(id)? {
            Slot::Live(stepper) => Some(stepper.container()),
            Slot::Idle(container) => Some(container),
        }
    }

    pub fn is_live(&self, id: &ContainerId) -> bool {
        matches!(self.slots.get(id), Some(Slot::Live(_)))
    }

    /// Resolve a `#id` selector to a registered container.
    pub fn resolve(&self, selector: &str) -> Option<ContainerId> {
        ContainerId::from_selector(selector).filter(|id| self.slots.contains_key(id))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
