//! The markup a stepper drives: steps, indicators, nav buttons and counter.

use std::collections::BTreeSet;
use std::fmt;

use uuid::Uuid;

use crate::form::Form;

/// Stable identity of a stepper container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(String);

impl ContainerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate an id for a container that has none.
    pub fn generate() -> Self {
        Self(format!("stepper-{}", Uuid::new_v4().simple()))
    }

    /// Resolve a `#id` (or bare id) selector.
    pub fn from_selector(selector: &str) -> Option<Self> {
        let id = selector.trim().trim_start_matches('#');
        (!id.is_empty()).then(|| Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A set of state class names on an element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassList(BTreeSet<String>);

impl ClassList {
    pub fn add(&mut self, class: &str) {
        self.0.insert(class.to_string());
    }

    pub fn remove(&mut self, class: &str) {
        self.0.remove(class);
    }

    pub fn toggle(&mut self, class: &str, on: bool) {
        if on {
            self.add(class);
        } else {
            self.remove(class);
        }
    }

    pub fn contains(&self, class: &str) -> bool {
        self.0.contains(class)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// One step panel.
#[derive(Debug, Clone, Default)]
pub struct StepNode {
    pub title: String,
    /// Validation target checked before leaving this step forwards.
    pub form: Option<Form>,
    pub classes: ClassList,
    pub visible: bool,
}

impl StepNode {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn form(mut self, form: Form) -> Self {
        self.form = Some(form);
        self
    }
}

/// A step indicator (badge), optionally clickable to jump to its step.
#[derive(Debug, Clone)]
pub struct Indicator {
    pub label: String,
    pub clickable: bool,
    pub classes: ClassList,
    pub(crate) listening: bool,
}

impl Indicator {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            clickable: true,
            classes: ClassList::default(),
            listening: false,
        }
    }

    /// Opt out of click-to-jump.
    pub fn not_clickable(mut self) -> Self {
        self.clickable = false;
        self
    }

    /// Whether a stepper currently listens for clicks on this indicator.
    pub fn is_listening(&self) -> bool {
        self.listening
    }
}

/// Previous/next button state inside the container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavButton {
    pub disabled: bool,
    pub classes: ClassList,
}

/// A stepper container and everything inside it.
#[derive(Debug, Clone)]
pub struct StepContainer {
    id: ContainerId,
    pub steps: Vec<StepNode>,
    pub indicators: Vec<Indicator>,
    /// Persisted current step, as the container's step attribute.
    pub step_attr: Option<String>,
    /// Step counter text, `None` when the container has no counter.
    pub counter: Option<String>,
    pub prev_button: Option<NavButton>,
    pub next_button: Option<NavButton>,
}

impl StepContainer {
    pub fn new(id: ContainerId) -> Self {
        Self {
            id,
            steps: Vec::new(),
            indicators: Vec::new(),
            step_attr: None,
            counter: None,
            prev_button: None,
            next_button: None,
        }
    }

    /// A container without an id of its own.
    pub fn anonymous() -> Self {
        Self::new(ContainerId::generate())
    }

    pub fn step(mut self, step: StepNode) -> Self {
        self.steps.push(step);
        self
    }

    pub fn indicator(mut self, indicator: Indicator) -> Self {
        self.indicators.push(indicator);
        self
    }

    /// Add a step counter element.
    pub fn with_counter(mut self) -> Self {
        self.counter = Some(String::new());
        self
    }

    /// Add in-container previous/next buttons.
    pub fn with_nav_buttons(mut self) -> Self {
        self.prev_button = Some(NavButton::default());
        self.next_button = Some(NavButton::default());
        self
    }

    /// Preset the persisted step attribute.
    pub fn with_step_attr(mut self, step: impl Into<String>) -> Self {
        self.step_attr = Some(step.into());
        self
    }

    pub fn id(&self) -> &ContainerId {
        &self.id
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Step panel by 1-based index.
    pub fn step_node(&self, step: usize) -> Option<&StepNode> {
        step.checked_sub(1).and_then(|i| self.steps.get(i))
    }

    /// Indicator by 1-based index.
    pub fn indicator_node(&self, step: usize) -> Option<&Indicator> {
        step.checked_sub(1).and_then(|i| self.indicators.get(i))
    }

    /// The step recorded in the step attribute, if it parses.
    pub fn persisted_step(&self) -> Option<usize> {
        self.step_attr.as_deref()?.trim().parse().ok()
    }

    /// 1-based index of the step currently marked visible.
    pub fn visible_step(&self) -> Option<usize> {
        self.steps.iter().position(|s| s.visible).map(|i| i + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_resolution() {
        assert_eq!(
            ContainerId::from_selector("#frameworkStepper"),
            Some(ContainerId::new("frameworkStepper"))
        );
        assert_eq!(
            ContainerId::from_selector("wizard"),
            Some(ContainerId::new("wizard"))
        );
        assert_eq!(ContainerId::from_selector("#"), None);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(ContainerId::generate(), ContainerId::generate());
    }

    #[test]
    fn test_persisted_step_parsing() {
        let c = StepContainer::anonymous().with_step_attr("2");
        assert_eq!(c.persisted_step(), Some(2));
        let c = StepContainer::anonymous().with_step_attr("two");
        assert_eq!(c.persisted_step(), None);
    }

    #[test]
    fn test_class_list_toggle() {
        let mut classes = ClassList::default();
        classes.toggle("disabled", true);
        assert!(classes.contains("disabled"));
        classes.toggle("disabled", false);
        assert!(!classes.contains("disabled"));
    }
}
