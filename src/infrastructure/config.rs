use crate::domain::catalog::default_templates;
use crate::domain::grid::GridConfig;
use crate::domain::models::BlockTemplate;
use crate::infrastructure::error::InfraError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const GRID_JSON: &str = "grid.json";
const TEMPLATES_JSON: &str = "templates.json";
const SUPPORTED_SCHEMA: u64 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigBundle {
    pub grid: serde_json::Value,
    pub templates: serde_json::Value,
}

fn default_files() -> Result<HashMap<&'static str, serde_json::Value>, InfraError> {
    let mut grid = serde_json::to_value(GridConfig::default())?;
    if let Some(fields) = grid.as_object_mut() {
        fields.insert("schema".to_string(), serde_json::json!(SUPPORTED_SCHEMA));
    }
    Ok(HashMap::from([
        (GRID_JSON, grid),
        (
            TEMPLATES_JSON,
            serde_json::json!({
                "schema": SUPPORTED_SCHEMA,
                "templates": default_templates()
            }),
        ),
    ]))
}

pub fn ensure_default_configs(config_dir: &Path) -> Result<(), InfraError> {
    for (name, value) in default_files()? {
        let path = config_dir.join(name);
        if !path.exists() {
            let formatted = serde_json::to_string_pretty(&value)?;
            fs::write(path, format!("{formatted}\n"))?;
        }
    }
    Ok(())
}

fn read_config(path: &Path) -> Result<serde_json::Value, InfraError> {
    let raw = fs::read_to_string(path)?;
    let parsed: serde_json::Value = serde_json::from_str(&raw)?;
    let schema = parsed
        .get("schema")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| InfraError::InvalidConfig(format!("missing schema in {}", path.display())))?;
    if schema != SUPPORTED_SCHEMA {
        return Err(InfraError::InvalidConfig(format!(
            "unsupported schema {} in {}",
            schema,
            path.display()
        )));
    }
    Ok(parsed)
}

pub fn load_configs(config_dir: &Path) -> Result<ConfigBundle, InfraError> {
    Ok(ConfigBundle {
        grid: read_config(&config_dir.join(GRID_JSON))?,
        templates: read_config(&config_dir.join(TEMPLATES_JSON))?,
    })
}

pub fn load_grid_config(config_dir: &Path) -> Result<GridConfig, InfraError> {
    let path = config_dir.join(GRID_JSON);
    let parsed = read_config(&path)?;
    let grid: GridConfig = serde_json::from_value(parsed).map_err(|error| {
        InfraError::InvalidConfig(format!("{error} in {}", path.display()))
    })?;
    grid.validate()
        .map_err(|message| InfraError::InvalidConfig(format!("{message} in {}", path.display())))?;
    Ok(grid)
}

pub fn load_templates(config_dir: &Path) -> Result<Vec<BlockTemplate>, InfraError> {
    let path = config_dir.join(TEMPLATES_JSON);
    let parsed = read_config(&path)?;
    let Some(raw_templates) = parsed.get("templates") else {
        return Ok(Vec::new());
    };
    let templates: Vec<BlockTemplate> = serde_json::from_value(raw_templates.clone())?;
    for template in &templates {
        template.validate().map_err(|message| {
            InfraError::InvalidConfig(format!("{message} in {}", path.display()))
        })?;
    }
    Ok(templates)
}
