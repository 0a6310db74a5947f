use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::models::{Template, TemplateSection};
use crate::store::TemplateCatalog;

#[derive(Debug, Clone, Serialize)]
pub struct TemplateDetails {
    #[serde(flatten)]
    pub template: Template,
    pub sections: Vec<TemplateSection>,
}

#[derive(Clone)]
pub struct TemplateService {
    templates: Arc<dyn TemplateCatalog>,
}

impl TemplateService {
    pub fn new(templates: Arc<dyn TemplateCatalog>) -> Self {
        Self { templates }
    }

    pub async fn list(&self, category: Option<&str>) -> CoreResult<Vec<Template>> {
        Ok(self.templates.find_all(category).await?)
    }

    pub async fn get(&self, id: Uuid) -> CoreResult<TemplateDetails> {
        let template = self
            .templates
            .find_by_id(id)
            .await?
            .ok_or(CoreError::NotFound("template"))?;
        let sections = self.templates.find_sections(id).await?;
        Ok(TemplateDetails { template, sections })
    }
}
