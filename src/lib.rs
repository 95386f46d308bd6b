pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::commands::{GestureEvent, GestureOutcome, PlannerState};
pub use domain::catalog::{TemplateCatalog, TemplateDeletion};
pub use domain::engine::SchedulingEngine;
pub use domain::error::Rejected;
pub use domain::grid::{BlockLayout, GridConfig};
pub use domain::models::{BlockTemplate, Day, ScheduledBlock};
pub use domain::schedule::{DayLayoutEntry, Schedule};
pub use infrastructure::error::InfraError;
