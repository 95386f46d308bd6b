use crate::domain::ids::next_id;
use crate::domain::models::{BlockTemplate, DEFAULT_COLOR};
use crate::domain::schedule::Schedule;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Palette of block templates, listed in creation order.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: HashMap<String, BlockTemplate>,
    template_order: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDeletion {
    pub template: BlockTemplate,
    pub removed_block_ids: Vec<String>,
}

pub fn default_templates() -> Vec<BlockTemplate> {
    [
        ("work", "Work", "Work time", "bg-blue-300"),
        ("eat", "Eat", "Meal time", "bg-green-300"),
        ("sleep", "Sleep", "Sleep time", "bg-purple-300"),
    ]
    .into_iter()
    .map(|(id, name, description, color)| BlockTemplate {
        id: id.to_string(),
        name: name.to_string(),
        description: Some(description.to_string()),
        color: color.to_string(),
    })
    .collect()
}

impl TemplateCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_templates(templates: impl IntoIterator<Item = BlockTemplate>) -> Result<Self, String> {
        let mut catalog = Self::new();
        for template in templates {
            catalog.insert(template)?;
        }
        Ok(catalog)
    }

    pub fn create(
        &mut self,
        name: &str,
        description: Option<&str>,
        color: Option<&str>,
    ) -> Result<BlockTemplate, String> {
        let name = name.trim();
        if name.is_empty() {
            return Err("template.name must not be empty".to_string());
        }
        let template = BlockTemplate {
            id: next_id("tpl"),
            name: name.to_string(),
            description: description
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(ToOwned::to_owned),
            color: color
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .unwrap_or(DEFAULT_COLOR)
                .to_string(),
        };
        self.insert(template.clone())?;
        Ok(template)
    }

    pub fn insert(&mut self, template: BlockTemplate) -> Result<(), String> {
        template.validate()?;
        if self.templates.contains_key(&template.id) {
            return Err(format!("duplicate template id: {}", template.id));
        }
        self.template_order.push(template.id.clone());
        self.templates.insert(template.id.clone(), template);
        Ok(())
    }

    pub fn get(&self, template_id: &str) -> Option<&BlockTemplate> {
        self.templates.get(template_id)
    }

    pub fn contains(&self, template_id: &str) -> bool {
        self.templates.contains_key(template_id)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn list(&self) -> Vec<&BlockTemplate> {
        self.template_order
            .iter()
            .filter_map(|template_id| self.templates.get(template_id))
            .collect()
    }

    pub fn remove(&mut self, template_id: &str) -> Option<BlockTemplate> {
        let removed = self.templates.remove(template_id)?;
        self.template_order.retain(|candidate| candidate != template_id);
        Some(removed)
    }
}

/// Deletes a template and every scheduled block that was placed from it.
pub fn cascade_template_removal(
    catalog: &mut TemplateCatalog,
    schedule: &mut Schedule,
    template_id: &str,
) -> Option<TemplateDeletion> {
    let template = catalog.remove(template_id)?;
    let removed_block_ids = schedule.remove_by_template(template_id);
    debug!(
        template_id = %template_id,
        removed = removed_block_ids.len(),
        "Template removed"
    );
    Some(TemplateDeletion {
        template,
        removed_block_ids,
    })
}
