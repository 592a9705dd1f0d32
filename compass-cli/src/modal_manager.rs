//! New-framework wizard.
//!
//! A two-step stepper (details form, then control items) registered in a
//! [`StepperRegistry`] and driven through stepper control clicks. The
//! stepper instance lives only while the modal is open.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

use compass_lib::error::Error;
use compass_lib::model::{ControlItem, CreatedFramework, FrameworkInput};
use compass_lib::services::FrameworkService;
use compass_lib::template::{FileInfo, FileKind, file_info, read_template, validate_file};
use compass_ui::events::{Click, EventBus};
use compass_ui::form::{Field, Form};
use compass_ui::validation::Validatable;
use compass_ui::stepper::{
    CONTROL_ATTR, ContainerId, Indicator, StepContainer, StepNode, Stepper, StepperConfig,
    StepperError, StepperRegistry, TARGET_ATTR, wire_controls,
};

/// Container id of the wizard.
pub const FRAMEWORK_STEPPER: &str = "frameworkStepper";

pub const DETAILS_STEP: usize = 1;
pub const CONTROLS_STEP: usize = 2;

/// Values captured from a step when leaving it.
pub type StepData = BTreeMap<String, String>;

pub struct ModalManager {
    registry: Rc<RefCell<StepperRegistry>>,
    bus: EventBus,
    stepper_id: ContainerId,
    details: Form,
    controls: Rc<RefCell<Vec<ControlItem>>>,
    step_data: Rc<RefCell<BTreeMap<usize, StepData>>>,
    template: Option<FileInfo>,
    open: bool,
}

impl ModalManager {
    pub fn new() -> Self {
        let registry = Rc::new(RefCell::new(StepperRegistry::new()));
        let mut bus = EventBus::new();
        wire_controls(&mut bus, registry.clone());

        Self {
            registry,
            bus,
            stepper_id: ContainerId::new(FRAMEWORK_STEPPER),
            details: details_form(),
            controls: Rc::new(RefCell::new(Vec::new())),
            step_data: Rc::new(RefCell::new(BTreeMap::new())),
            template: None,
            open: false,
        }
    }

    /// Register the wizard container if needed and make its stepper live.
    ///
    /// Returns the current step.
    pub fn ensure_stepper_instance(&mut self) -> Result<usize, StepperError> {
        let mut registry = self.registry.borrow_mut();
        if registry.container(&self.stepper_id).is_none() {
            registry.insert(self.build_container())?;
        }

        let form = self.details.clone();
        let controls = self.controls.clone();
        let step_data = self.step_data.clone();
        let stepper = registry.acquire_with(&self.stepper_id, move || {
            StepperConfig::new()
                .on_before_step_change(move |from, _to| {
                    let data = match from {
                        DETAILS_STEP => form.values(),
                        _ => BTreeMap::from([(
                            "controls".to_string(),
                            controls.borrow().len().to_string(),
                        )]),
                    };
                    step_data.borrow_mut().insert(from, data);
                    true
                })
                .on_change(|from, to| log::debug!("Framework wizard step {} -> {}", from, to))
        })?;
        Ok(stepper.current())
    }

    pub fn open_new_framework_modal(&mut self) -> Result<(), StepperError> {
        self.reset_framework_form();
        self.ensure_stepper_instance()?;
        if let Some(stepper) = self.registry.borrow_mut().get_mut(&self.stepper_id) {
            stepper.reset();
            stepper.clear_step_error(DETAILS_STEP);
        }
        self.open = true;
        Ok(())
    }

    /// Close the modal, destroying the stepper and discarding input.
    pub fn close_new_framework_modal(&mut self) {
        self.open = false;
        self.registry.borrow_mut().remove(&self.stepper_id);
        self.reset_framework_form();
    }

    /// Clear the details form, attached template and captured step data.
    pub fn reset_framework_form(&mut self) {
        self.details.reset();
        self.controls.borrow_mut().clear();
        self.step_data.borrow_mut().clear();
        self.template = None;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Set a details field. Returns false for unknown fields.
    pub fn set_field(&mut self, name: &str, value: &str) -> bool {
        self.details.set_value(name, value)
    }

    pub fn details(&self) -> &Form {
        &self.details
    }

    pub fn controls(&self) -> Vec<ControlItem> {
        self.controls.borrow().clone()
    }

    pub fn template(&self) -> Option<&FileInfo> {
        self.template.as_ref()
    }

    /// Values captured when `step` was last left.
    pub fn step_data(&self, step: usize) -> Option<StepData> {
        self.step_data.borrow().get(&step).cloned()
    }

    /// Read a template file and use its rows as the control items.
    ///
    /// Returns the number of items found.
    pub async fn attach_template(&mut self, path: &Path) -> Result<usize, Error> {
        let info = file_info(path).await?;
        if let Some(error) = validate_file(&info.name, info.size, FileKind::Template)
            .into_iter()
            .next()
        {
            return Err(error.into());
        }

        let items = read_template(path).await?.control_items();
        let count = items.len();
        log::info!("Template {} provided {} control items", info.name, count);
        *self.controls.borrow_mut() = items;
        self.template = Some(info);
        Ok(count)
    }

    /// Deliver a click to the wizard's controls.
    pub fn click(&mut self, click: &Click) {
        self.bus.click(click);
    }

    /// Run a stepper control action (`next`, `prev`, `reset`, `go:N`, ...)
    /// against the wizard. Returns the step afterwards.
    pub fn step(&mut self, action: &str) -> Option<usize> {
        let selector = format!("#{}", self.stepper_id);
        self.click(&Click::on([
            (CONTROL_ATTR, action.to_string()),
            (TARGET_ATTR, selector),
        ]));
        self.current_step()
    }

    pub fn current_step(&self) -> Option<usize> {
        self.registry
            .borrow()
            .get(&self.stepper_id)
            .map(Stepper::current)
    }

    /// Run `f` against the live stepper.
    pub fn with_stepper<R>(&self, f: impl FnOnce(&Stepper) -> R) -> Option<R> {
        self.registry.borrow().get(&self.stepper_id).map(f)
    }

    /// Create the framework from the wizard's input and close the modal.
    ///
    /// Validation failures send the wizard back to the details step with
    /// that step flagged.
    pub async fn submit(&mut self, service: &FrameworkService) -> Result<CreatedFramework, Error> {
        let value = |name: &str| self.details.value(name).unwrap_or_default();
        let input = FrameworkInput {
            name: value("name"),
            short_name: value("shortName"),
            description: value("description"),
            controls: self.controls(),
            template: self.template.clone(),
        };

        match service.create_framework(input).await {
            Ok(created) => {
                log::info!("Created framework {:?}", created.id);
                self.close_new_framework_modal();
                Ok(created)
            }
            Err(e) => {
                if let Error::Validation(errors) = &e {
                    self.details.check_validity();
                    // the service trims, so whitespace-only input fails here
                    for error in errors {
                        if let Some(field) = self.details.field(&error.field) {
                            field.set_error(error.message.clone());
                        }
                    }
                    if let Some(stepper) = self.registry.borrow_mut().get_mut(&self.stepper_id) {
                        stepper.go_to(DETAILS_STEP, true);
                        stepper.set_step_error(DETAILS_STEP);
                    }
                }
                Err(e)
            }
        }
    }

    fn build_container(&self) -> StepContainer {
        StepContainer::new(self.stepper_id.clone())
            .step(StepNode::new("Framework Details").form(self.details.clone()))
            .step(StepNode::new("Control Items"))
            .indicator(Indicator::new("Details"))
            .indicator(Indicator::new("Controls"))
            .with_counter()
            .with_nav_buttons()
    }
}

impl Default for ModalManager {
    fn default() -> Self {
        Self::new()
    }
}

fn details_form() -> Form {
    Form::new("frameworkForm")
        .with_field(
            Field::text("name")
                .required()
                .error_text("Framework name is required"),
        )
        .with_field(
            Field::text("shortName")
                .required()
                .error_text("Framework short name is required"),
        )
        .with_field(Field::text("description"))
}

#[cfg(test)]
mod tests {
    use compass_lib::{ApiClient, ApiMode};

    use super::*;

    fn service() -> FrameworkService {
        FrameworkService::new(ApiClient::builder().mode(ApiMode::Json).build().unwrap())
    }

    #[test]
    fn test_details_step_gates_forward_moves() {
        let mut modal = ModalManager::new();
        modal.open_new_framework_modal().unwrap();
        assert_eq!(modal.current_step(), Some(DETAILS_STEP));

        assert_eq!(modal.step("next"), Some(DETAILS_STEP));
        let name = modal.details().field("name").unwrap();
        assert!(name.is_invalid());
        assert!(name.error_visible());

        modal.set_field("name", "SOC 2");
        modal.set_field("shortName", "SOC2");
        assert_eq!(modal.step("next"), Some(CONTROLS_STEP));
        assert!(!modal.details().field("name").unwrap().is_invalid());

        let snapshot = modal.step_data(DETAILS_STEP).unwrap();
        assert_eq!(snapshot["name"], "SOC 2");

        assert_eq!(modal.step("prev"), Some(DETAILS_STEP));
        assert_eq!(modal.step_data(CONTROLS_STEP).unwrap()["controls"], "0");
        assert_eq!(modal.step("go:2"), Some(CONTROLS_STEP));
        assert_eq!(modal.step("reset"), Some(DETAILS_STEP));
    }

    #[test]
    fn test_counter_and_buttons_follow_step() {
        let mut modal = ModalManager::new();
        modal.open_new_framework_modal().unwrap();
        modal.set_field("name", "ISO");
        modal.set_field("shortName", "ISO");
        modal.step("next");

        let (counter, next_disabled) = modal
            .with_stepper(|s| {
                let container = s.container();
                (
                    container.counter.clone(),
                    container.next_button.as_ref().map(|b| b.disabled),
                )
            })
            .unwrap();
        assert_eq!(counter.as_deref(), Some("2/2"));
        assert_eq!(next_disabled, Some(true));
    }

    #[test]
    fn test_close_destroys_stepper() {
        let mut modal = ModalManager::new();
        modal.open_new_framework_modal().unwrap();
        modal.set_field("name", "draft");
        modal.close_new_framework_modal();

        assert!(!modal.is_open());
        assert_eq!(modal.current_step(), None);
        assert_eq!(modal.step("next"), None);
        assert_eq!(modal.details().value("name").as_deref(), Some(""));

        modal.open_new_framework_modal().unwrap();
        assert_eq!(modal.current_step(), Some(DETAILS_STEP));
    }

    #[tokio::test]
    async fn test_attach_template() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("controls.csv");
        std::fs::write(
            &csv,
            "Control ID,Category,Description\nCC1.1,Environment,Integrity\nCC1.2,Environment,Oversight\n",
        )
        .unwrap();

        let mut modal = ModalManager::new();
        modal.open_new_framework_modal().unwrap();
        assert_eq!(modal.attach_template(&csv).await.unwrap(), 2);
        assert_eq!(modal.controls()[1].control_id, "CC1.2");
        assert_eq!(modal.template().unwrap().extension, ".csv");

        let image = dir.path().join("logo.png");
        std::fs::write(&image, "png").unwrap();
        let err = modal.attach_template(&image).await.unwrap_err();
        assert!(matches!(err, Error::Template(_)));
        assert_eq!(modal.controls().len(), 2);
    }

    #[tokio::test]
    async fn test_submit_creates_and_closes() {
        let mut modal = ModalManager::new();
        modal.open_new_framework_modal().unwrap();
        modal.set_field("name", " NIST CSF ");
        modal.set_field("shortName", "NIST");

        let created = modal.submit(&service()).await.unwrap();
        assert!(created.id.unwrap().starts_with("local-"));
        assert_eq!(created.body["name"], "NIST CSF");
        assert!(!modal.is_open());
    }

    #[tokio::test]
    async fn test_submit_validation_returns_to_details() {
        let mut modal = ModalManager::new();
        modal.open_new_framework_modal().unwrap();
        modal.set_field("name", "Draft");
        modal.set_field("shortName", "D");
        modal.step("next");
        modal.set_field("name", "  ");

        let err = modal.submit(&service()).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(modal.is_open());
        assert_eq!(modal.current_step(), Some(DETAILS_STEP));
        let flagged = modal
            .with_stepper(|s| s.container().steps[0].classes.contains("error"))
            .unwrap();
        assert!(flagged);
        let name = modal.details().field("name").unwrap();
        assert!(name.is_invalid());
        assert!(name.error_visible());
    }
}
