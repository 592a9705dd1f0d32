use crate::ApiClient;
use crate::error::{Error, FieldValidationError};
use crate::model::{
    CreatedFramework, DEFAULT_ICON, Framework, FrameworkDetails, FrameworkInput, NewFramework,
    STATUS_READY, STATUS_READY_CLASS,
};

/// Framework listing and creation.
#[derive(Debug, Clone)]
pub struct FrameworkService {
    api: ApiClient,
}

impl FrameworkService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub async fn get_frameworks(&self) -> Result<Vec<Framework>, Error> {
        self.api.get_frameworks().await
    }

    /// A framework with its control items.
    pub async fn get_framework_details(&self, id: &str) -> Result<FrameworkDetails, Error> {
        let framework = self
            .api
            .get_frameworks()
            .await?
            .into_iter()
            .find(|f| f.id == id)
            .ok_or_else(|| Error::invalid("id", format!("Framework '{}' not found", id)))?;
        let controls = self.api.get_framework_rows(id, None).await?;
        Ok(FrameworkDetails {
            framework,
            controls,
        })
    }

    /// Validate `input` and create the framework.
    ///
    /// Name and short name are required. New frameworks start out ready to
    /// map.
    pub async fn create_framework(&self, input: FrameworkInput) -> Result<CreatedFramework, Error> {
        let payload = prepare_framework(input)?;
        self.api.create_framework(&payload).await
    }
}

/// Trim and check the input, producing the creation payload.
pub fn prepare_framework(input: FrameworkInput) -> Result<NewFramework, Error> {
    let name = input.name.trim();
    let short_name = input.short_name.trim();

    let mut errors = Vec::new();
    if name.is_empty() {
        errors.push(FieldValidationError::new("name", "Framework name is required"));
    }
    if short_name.is_empty() {
        errors.push(FieldValidationError::new(
            "shortName",
            "Framework short name is required",
        ));
    }
    if !errors.is_empty() {
        return Err(Error::Validation(errors));
    }

    Ok(NewFramework {
        name: name.to_string(),
        short_name: short_name.to_string(),
        description: input.description.trim().to_string(),
        status: STATUS_READY.to_string(),
        status_class: STATUS_READY_CLASS.to_string(),
        icon: DEFAULT_ICON.to_string(),
        controls: input.controls,
        template: input.template,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_requires_names() {
        let err = prepare_framework(FrameworkInput {
            name: "  ".into(),
            ..Default::default()
        })
        .unwrap_err();
        match err {
            Error::Validation(errors) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, ["name", "shortName"]);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_prepare_trims_and_sets_status() {
        let payload = prepare_framework(FrameworkInput {
            name: " ISO 27001 ".into(),
            short_name: "ISO".into(),
            description: " Information security ".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(payload.name, "ISO 27001");
        assert_eq!(payload.description, "Information security");
        assert_eq!(payload.status, "Ready to Map");
        assert_eq!(payload.status_class, "status-ready");
        assert_eq!(payload.icon, "bi-grid");
        assert!(payload.template.is_none());
    }
}
