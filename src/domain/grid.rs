//! Discrete time grid shared by every engine operation.
//!
//! Hour values handed to and returned from the engine are real numbers, but every
//! comparison is done on integer grid indices so that repeated conversion never drifts.
//! The unit is kept in whole minutes, which makes every aligned hour value an exact
//! multiple of 1/60.

use crate::domain::models::ScheduledBlock;
use serde::{Deserialize, Serialize};

pub const DEFAULT_UNIT_MINUTES: u32 = 10;
pub const DEFAULT_DAY_START_HOUR: u32 = 0;
pub const DEFAULT_DAY_LENGTH_HOURS: u32 = 24;

const MINUTES_PER_HOUR: f64 = 60.0;

/// Rounds `value` to the nearest multiple of `unit`.
pub fn snap(value: f64, unit: f64) -> f64 {
    (value / unit).round() * unit
}

/// Renders an hour value as a `HH:MM` clock label.
pub fn format_clock(hour: f64) -> String {
    let total_minutes = (hour * MINUTES_PER_HOUR).round() as i64;
    format!("{:02}:{:02}", total_minutes.div_euclid(60), total_minutes.rem_euclid(60))
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct GridConfig {
    pub unit_minutes: u32,
    pub day_start_hour: u32,
    pub day_length_hours: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            unit_minutes: DEFAULT_UNIT_MINUTES,
            day_start_hour: DEFAULT_DAY_START_HOUR,
            day_length_hours: DEFAULT_DAY_LENGTH_HOURS,
        }
    }
}

/// Half-open run of grid cells `[start, start + steps)`, measured from day start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: i64,
    pub steps: i64,
}

impl Span {
    pub fn end(&self) -> i64 {
        self.start + self.steps
    }
}

/// Geometry of a block relative to the start of its day, in hours.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BlockLayout {
    pub offset: f64,
    pub extent: f64,
}

impl GridConfig {
    pub fn with_unit_minutes(unit_minutes: u32) -> Self {
        Self {
            unit_minutes,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.unit_minutes == 0 {
            return Err("grid.unit_minutes must be > 0".to_string());
        }
        if self.day_length_hours == 0 {
            return Err("grid.day_length_hours must be > 0".to_string());
        }
        if u64::from(self.day_start_hour) + u64::from(self.day_length_hours) > 24 {
            return Err("grid day must end at or before hour 24".to_string());
        }
        if (u64::from(self.day_length_hours) * 60) % u64::from(self.unit_minutes) != 0 {
            return Err(format!(
                "grid.day_length_hours ({}) must be a whole number of {}-minute units",
                self.day_length_hours, self.unit_minutes
            ));
        }
        Ok(())
    }

    /// Grid unit in hours.
    pub fn unit(&self) -> f64 {
        self.unit_minutes as f64 / MINUTES_PER_HOUR
    }

    pub fn day_start(&self) -> f64 {
        self.day_start_hour as f64
    }

    pub fn day_end(&self) -> f64 {
        self.day_start() + self.day_length_hours as f64
    }

    /// Number of addressable cells in one day.
    pub fn slot_count(&self) -> i64 {
        (self.day_length_hours as i64 * 60) / self.unit_minutes as i64
    }

    pub fn to_grid_index(&self, hour: f64) -> i64 {
        ((hour - self.day_start()) * MINUTES_PER_HOUR / self.unit_minutes as f64).round() as i64
    }

    pub fn from_grid_index(&self, index: i64) -> f64 {
        self.day_start() + self.offset_from_index(index)
    }

    /// Whole units in a duration, rounded to the nearest unit.
    pub fn steps(&self, hours: f64) -> i64 {
        (hours * MINUTES_PER_HOUR / self.unit_minutes as f64).round() as i64
    }

    pub fn duration_from_steps(&self, steps: i64) -> f64 {
        (steps * self.unit_minutes as i64) as f64 / MINUTES_PER_HOUR
    }

    /// Snaps an absolute hour to the nearest grid line, measured from day start.
    pub fn snap(&self, hour: f64) -> f64 {
        self.from_grid_index(self.to_grid_index(hour))
    }

    pub fn min_duration(&self) -> f64 {
        self.duration_from_steps(1)
    }

    /// One hour when an hour is a whole number of units, otherwise a single unit.
    pub fn default_duration(&self) -> f64 {
        self.duration_from_steps(self.default_steps())
    }

    pub fn default_steps(&self) -> i64 {
        if 60 % self.unit_minutes == 0 {
            (60 / self.unit_minutes) as i64
        } else {
            1
        }
    }

    pub fn span_of(&self, start_time: f64, duration: f64) -> Span {
        Span {
            start: self.to_grid_index(start_time),
            steps: self.steps(duration),
        }
    }

    pub fn block_span(&self, block: &ScheduledBlock) -> Span {
        self.span_of(block.start_time, block.duration)
    }

    /// Keeps a run of `steps` cells starting at `start` inside the day.
    pub fn clamp_start_index(&self, start: i64, steps: i64) -> i64 {
        let latest = (self.slot_count() - steps).max(0);
        start.clamp(0, latest)
    }

    /// Raises `steps` to one unit and caps it so the run ends by the day end.
    pub fn clamp_steps(&self, start: i64, steps: i64) -> i64 {
        let available = (self.slot_count() - start).max(1);
        steps.clamp(1, available)
    }

    pub fn clamp_start(&self, start_time: f64, duration: f64) -> f64 {
        let index = self.clamp_start_index(self.to_grid_index(start_time), self.steps(duration));
        self.from_grid_index(index)
    }

    pub fn clamp_duration(&self, start_time: f64, duration: f64) -> f64 {
        let steps = self.clamp_steps(self.to_grid_index(start_time), self.steps(duration));
        self.duration_from_steps(steps)
    }

    pub fn layout(&self, block: &ScheduledBlock) -> BlockLayout {
        let span = self.block_span(block);
        BlockLayout {
            offset: self.offset_from_index(span.start),
            extent: self.duration_from_steps(span.steps),
        }
    }

    /// Recovers `(start_time, duration)` from a layout produced by [`GridConfig::layout`].
    pub fn resolve_layout(&self, layout: &BlockLayout) -> (f64, f64) {
        let start_index = self.steps(layout.offset);
        (
            self.from_grid_index(start_index),
            self.duration_from_steps(self.steps(layout.extent)),
        )
    }

    fn offset_from_index(&self, index: i64) -> f64 {
        (index * self.unit_minutes as i64) as f64 / MINUTES_PER_HOUR
    }
}
