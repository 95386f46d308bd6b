use crate::application::bootstrap::bootstrap_workspace;
use crate::domain::catalog::{TemplateCatalog, TemplateDeletion};
use crate::domain::engine::SchedulingEngine;
use crate::domain::error::Rejected;
use crate::domain::grid::{BlockLayout, format_clock};
use crate::domain::models::{BlockTemplate, Day, PALETTE_COLORS, ScheduledBlock};
use crate::domain::schedule::{DayLayoutEntry, Schedule};
use crate::infrastructure::config::{load_grid_config, load_templates};
use crate::infrastructure::error::InfraError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

pub struct PlannerState {
    workspace_root: PathBuf,
    config_dir: PathBuf,
    logs_dir: PathBuf,
    engine: SchedulingEngine,
    runtime: Mutex<RuntimeState>,
    log_guard: Mutex<()>,
}

impl PlannerState {
    pub fn new(workspace_root: PathBuf) -> Result<Self, InfraError> {
        let bootstrap = bootstrap_workspace(&workspace_root)?;
        let grid = load_grid_config(&bootstrap.config_dir)?;
        let engine = SchedulingEngine::new(grid).map_err(InfraError::InvalidConfig)?;
        let catalog = TemplateCatalog::from_templates(load_templates(&bootstrap.config_dir)?)
            .map_err(InfraError::InvalidConfig)?;

        Ok(Self {
            workspace_root: bootstrap.workspace_root,
            config_dir: bootstrap.config_dir,
            logs_dir: bootstrap.logs_dir,
            engine,
            runtime: Mutex::new(RuntimeState {
                schedule: Schedule::new(),
                catalog,
            }),
            log_guard: Mutex::new(()),
        })
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn engine(&self) -> &SchedulingEngine {
        &self.engine
    }

    /// Logs a failed command and renders it for the UI boundary. Overlaps are ordinary
    /// user feedback; everything else points at a caller bug.
    pub fn command_error(&self, command: &str, error: &InfraError) -> String {
        match error {
            InfraError::Rejected(Rejected::Overlap) => self.log_info(command, &error.to_string()),
            _ => self.log_error(command, &error.to_string()),
        }
        error.to_string()
    }

    pub fn log_info(&self, command: &str, message: &str) {
        self.append_log("info", command, message);
    }

    pub fn log_error(&self, command: &str, message: &str) {
        self.append_log("error", command, message);
    }

    fn append_log(&self, level: &str, command: &str, message: &str) {
        let Ok(_guard) = self.log_guard.lock() else {
            return;
        };
        let path = self.logs_dir.join("commands.log");
        let payload = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "level": level,
            "command": command,
            "message": message,
        });

        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
            let _ = writeln!(file, "{}", payload);
        }
    }
}

#[derive(Debug)]
struct RuntimeState {
    schedule: Schedule,
    catalog: TemplateCatalog,
}

/// Drag/drop gestures as resolved by the gesture layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GestureEvent {
    DropTemplate {
        template_id: String,
        day: String,
        start_time: f64,
    },
    ResizeBlock {
        block_id: String,
        duration: f64,
    },
    MoveBlock {
        block_id: String,
        over_block_id: String,
    },
    RemoveBlock {
        block_id: String,
    },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GestureOutcome {
    Placed { block: ScheduledBlock },
    Resized { block: ScheduledBlock },
    Reordered { blocks: Vec<ScheduledBlock> },
    Removed { block_id: String, removed: bool },
}

pub fn place_block_impl(
    state: &PlannerState,
    template_id: String,
    day: String,
    start_time: f64,
) -> Result<ScheduledBlock, InfraError> {
    let template_id = required_id(&template_id, "template_id")?;
    let day = parse_day(&day)?;
    let start_time = finite_hours(start_time, "start_time")?;

    let placed = {
        let mut runtime = lock_runtime(state)?;
        if !runtime.catalog.contains(template_id) {
            return Err(InfraError::NotFound(format!("template not found: {template_id}")));
        }
        state
            .engine
            .place(&mut runtime.schedule, template_id, day, start_time)?
    };

    state.log_info(
        "place_block",
        &format!(
            "placed block_id={} template_id={template_id} day={day} start={} end={}",
            placed.id,
            format_clock(placed.start_time),
            format_clock(placed.end_time())
        ),
    );
    Ok(placed)
}

pub fn resize_block_impl(
    state: &PlannerState,
    block_id: String,
    duration: f64,
) -> Result<ScheduledBlock, InfraError> {
    let block_id = required_id(&block_id, "block_id")?;
    let duration = finite_hours(duration, "duration")?;

    let resized = {
        let mut runtime = lock_runtime(state)?;
        state.engine.resize(&mut runtime.schedule, block_id, duration)?
    };

    state.log_info(
        "resize_block",
        &format!(
            "resized block_id={block_id} duration={} end={}",
            resized.duration,
            format_clock(resized.end_time())
        ),
    );
    Ok(resized)
}

pub fn reorder_day_impl(
    state: &PlannerState,
    day: String,
    block_ids: Vec<String>,
) -> Result<Vec<ScheduledBlock>, InfraError> {
    let day = parse_day(&day)?;
    let block_ids = block_ids
        .iter()
        .map(|block_id| block_id.trim())
        .collect::<Vec<_>>();

    let reordered = {
        let mut runtime = lock_runtime(state)?;
        state.engine.reorder(&mut runtime.schedule, day, &block_ids)?
    };

    state.log_info(
        "reorder_day",
        &format!("repacked {} blocks on {day}", reordered.len()),
    );
    Ok(reordered)
}

pub fn move_block_impl(
    state: &PlannerState,
    block_id: String,
    over_block_id: String,
) -> Result<Vec<ScheduledBlock>, InfraError> {
    let block_id = required_id(&block_id, "block_id")?;
    let over_block_id = required_id(&over_block_id, "over_block_id")?;

    let reordered = {
        let mut runtime = lock_runtime(state)?;
        state
            .engine
            .move_block(&mut runtime.schedule, block_id, over_block_id)?
    };

    state.log_info(
        "move_block",
        &format!("moved block_id={block_id} onto block_id={over_block_id}"),
    );
    Ok(reordered)
}

pub fn remove_block_impl(state: &PlannerState, block_id: String) -> Result<bool, InfraError> {
    let block_id = block_id.trim();
    if block_id.is_empty() {
        return Ok(false);
    }

    let removed = {
        let mut runtime = lock_runtime(state)?;
        state.engine.remove(&mut runtime.schedule, block_id)
    };
    if removed {
        state.log_info("remove_block", &format!("removed block_id={block_id}"));
    }
    Ok(removed)
}

pub fn layout_block_impl(state: &PlannerState, block_id: String) -> Result<BlockLayout, InfraError> {
    let block_id = required_id(&block_id, "block_id")?;
    let runtime = lock_runtime(state)?;
    let Some(block) = runtime.schedule.get(block_id) else {
        return Err(InfraError::NotFound(format!("block not found: {block_id}")));
    };
    Ok(state.engine.layout(block))
}

pub fn layout_day_impl(state: &PlannerState, day: String) -> Result<Vec<DayLayoutEntry>, InfraError> {
    let day = parse_day(&day)?;
    let runtime = lock_runtime(state)?;
    Ok(state
        .engine
        .layout_day(&runtime.schedule, &runtime.catalog, day))
}

pub fn list_blocks_impl(
    state: &PlannerState,
    day: Option<String>,
) -> Result<Vec<ScheduledBlock>, InfraError> {
    let day = day
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(parse_day)
        .transpose()?;

    let runtime = lock_runtime(state)?;
    let blocks = match day {
        Some(day) => runtime.schedule.day_blocks(day),
        None => runtime.schedule.sorted_blocks(),
    };
    Ok(blocks.into_iter().cloned().collect())
}

pub fn create_template_impl(
    state: &PlannerState,
    name: String,
    description: Option<String>,
    color: Option<String>,
) -> Result<BlockTemplate, InfraError> {
    let template = {
        let mut runtime = lock_runtime(state)?;
        runtime
            .catalog
            .create(&name, description.as_deref(), color.as_deref())
            .map_err(InfraError::InvalidInput)?
    };

    state.log_info(
        "create_template",
        &format!("created template_id={} name={}", template.id, template.name),
    );
    Ok(template)
}

pub fn list_templates_impl(state: &PlannerState) -> Result<Vec<BlockTemplate>, InfraError> {
    let runtime = lock_runtime(state)?;
    Ok(runtime.catalog.list().into_iter().cloned().collect())
}

/// Colours offered by the palette editor. Templates may still carry any colour string.
pub fn list_palette_impl() -> Vec<String> {
    PALETTE_COLORS.iter().map(|color| color.to_string()).collect()
}

pub fn delete_template_impl(
    state: &PlannerState,
    template_id: String,
) -> Result<TemplateDeletion, InfraError> {
    let template_id = required_id(&template_id, "template_id")?;

    let deletion = {
        let mut runtime = lock_runtime(state)?;
        let RuntimeState { schedule, catalog } = &mut *runtime;
        state
            .engine
            .remove_template(catalog, schedule, template_id)
            .ok_or_else(|| InfraError::NotFound(format!("template not found: {template_id}")))?
    };

    state.log_info(
        "delete_template",
        &format!(
            "deleted template_id={template_id} cascaded_blocks={}",
            deletion.removed_block_ids.len()
        ),
    );
    Ok(deletion)
}

pub fn handle_gesture_impl(
    state: &PlannerState,
    event: GestureEvent,
) -> Result<GestureOutcome, InfraError> {
    match event {
        GestureEvent::DropTemplate {
            template_id,
            day,
            start_time,
        } => place_block_impl(state, template_id, day, start_time)
            .map(|block| GestureOutcome::Placed { block }),
        GestureEvent::ResizeBlock { block_id, duration } => {
            resize_block_impl(state, block_id, duration)
                .map(|block| GestureOutcome::Resized { block })
        }
        GestureEvent::MoveBlock {
            block_id,
            over_block_id,
        } => move_block_impl(state, block_id, over_block_id)
            .map(|blocks| GestureOutcome::Reordered { blocks }),
        GestureEvent::RemoveBlock { block_id } => {
            let removed = remove_block_impl(state, block_id.clone())?;
            Ok(GestureOutcome::Removed { block_id, removed })
        }
    }
}

fn lock_runtime(state: &PlannerState) -> Result<MutexGuard<'_, RuntimeState>, InfraError> {
    state
        .runtime
        .lock()
        .map_err(|error| InfraError::InvalidConfig(format!("runtime lock poisoned: {error}")))
}

fn required_id<'a>(value: &'a str, field_name: &str) -> Result<&'a str, InfraError> {
    let normalized = value.trim();
    if normalized.is_empty() {
        return Err(InfraError::InvalidInput(format!(
            "{field_name} must not be empty"
        )));
    }
    Ok(normalized)
}

fn parse_day(value: &str) -> Result<Day, InfraError> {
    value.parse::<Day>().map_err(InfraError::InvalidInput)
}

fn finite_hours(value: f64, field_name: &str) -> Result<f64, InfraError> {
    if !value.is_finite() {
        return Err(InfraError::InvalidInput(format!(
            "{field_name} must be a finite number of hours"
        )));
    }
    Ok(value)
}
