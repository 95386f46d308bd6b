use crate::domain::catalog::TemplateCatalog;
use crate::domain::grid::{BlockLayout, GridConfig};
use crate::domain::ids::next_id;
use crate::domain::models::{Day, ScheduledBlock};
use crate::domain::overlap::intervals_overlap;
use serde::Serialize;
use std::collections::HashMap;

/// Caller-owned arena of scheduled blocks keyed by block id.
///
/// Blocks only enter the arena through placement (or [`Schedule::from_blocks`], which
/// checks the same invariants), so every day held here is free of overlaps.
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    blocks: HashMap<String, ScheduledBlock>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayLayoutEntry {
    pub block_id: String,
    pub template_id: String,
    pub layout: BlockLayout,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hydrates a schedule from blocks held elsewhere, refusing any set that is
    /// off-grid, outside the day, or overlapping.
    pub fn from_blocks(
        blocks: impl IntoIterator<Item = ScheduledBlock>,
        grid: &GridConfig,
    ) -> Result<Self, String> {
        let mut schedule = Self::new();
        for block in blocks {
            block.validate()?;
            let span = grid.block_span(&block);
            if grid.from_grid_index(span.start) != block.start_time
                || grid.duration_from_steps(span.steps) != block.duration
            {
                return Err(format!("block {} is not aligned to the grid", block.id));
            }
            if span.start < 0 || span.steps < 1 || span.end() > grid.slot_count() {
                return Err(format!("block {} lies outside the day", block.id));
            }
            if schedule.contains(&block.id) {
                return Err(format!("duplicate block id: {}", block.id));
            }
            if let Some(other) = schedule
                .day_blocks(block.day)
                .into_iter()
                .find(|other| intervals_overlap(grid.block_span(other), span))
            {
                return Err(format!("block {} overlaps block {}", block.id, other.id));
            }
            schedule.blocks.insert(block.id.clone(), block);
        }
        Ok(schedule)
    }

    pub fn get(&self, block_id: &str) -> Option<&ScheduledBlock> {
        self.blocks.get(block_id)
    }

    pub fn contains(&self, block_id: &str) -> bool {
        self.blocks.contains_key(block_id)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduledBlock> {
        self.blocks.values()
    }

    /// Blocks of one day ordered by start time.
    pub fn day_blocks(&self, day: Day) -> Vec<&ScheduledBlock> {
        let mut blocks = self
            .blocks
            .values()
            .filter(|block| block.day == day)
            .collect::<Vec<_>>();
        blocks.sort_by(|left, right| {
            left.start_time
                .total_cmp(&right.start_time)
                .then_with(|| left.id.cmp(&right.id))
        });
        blocks
    }

    /// Every block ordered by day, then start time.
    pub fn sorted_blocks(&self) -> Vec<&ScheduledBlock> {
        Day::ALL
            .iter()
            .flat_map(|day| self.day_blocks(*day))
            .collect()
    }

    /// Removes a block. Missing ids are a no-op.
    pub fn remove(&mut self, block_id: &str) -> Option<ScheduledBlock> {
        self.blocks.remove(block_id)
    }

    /// Removes every block placed from `template_id`, returning the removed ids.
    pub fn remove_by_template(&mut self, template_id: &str) -> Vec<String> {
        let mut removed = self
            .blocks
            .values()
            .filter(|block| block.template_id == template_id)
            .map(|block| block.id.clone())
            .collect::<Vec<_>>();
        removed.sort();
        for block_id in &removed {
            self.blocks.remove(block_id);
        }
        removed
    }

    /// Layouts for the renderable blocks of one day. Blocks whose template is gone are
    /// skipped.
    pub fn layout_day(
        &self,
        day: Day,
        catalog: &TemplateCatalog,
        grid: &GridConfig,
    ) -> Vec<DayLayoutEntry> {
        self.day_blocks(day)
            .into_iter()
            .filter(|block| catalog.contains(&block.template_id))
            .map(|block| DayLayoutEntry {
                block_id: block.id.clone(),
                template_id: block.template_id.clone(),
                layout: grid.layout(block),
            })
            .collect()
    }

    pub(crate) fn get_mut(&mut self, block_id: &str) -> Option<&mut ScheduledBlock> {
        self.blocks.get_mut(block_id)
    }

    pub(crate) fn insert(&mut self, block: ScheduledBlock) {
        self.blocks.insert(block.id.clone(), block);
    }

    pub(crate) fn fresh_block_id(&self) -> String {
        loop {
            let id = next_id("blk");
            if !self.contains(&id) {
                return id;
            }
        }
    }
}
