use crate::domain::error::Rejected;
use crate::domain::grid::GridConfig;
use crate::domain::models::{Day, ScheduledBlock};
use crate::domain::schedule::Schedule;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Repacks a day in the given order: the first block starts at the day start and each
/// following block starts where the previous one ends. Durations are preserved.
///
/// `order` must name every block of the day exactly once. Anything else, including an
/// empty day, is refused with [`Rejected::InvalidReorder`] and nothing is written.
pub fn reorder<S: AsRef<str>>(
    schedule: &mut Schedule,
    grid: &GridConfig,
    day: Day,
    order: &[S],
) -> Result<Vec<ScheduledBlock>, Rejected> {
    let packed = plan_repack(schedule, grid, day, order).inspect_err(|error| {
        warn!(day = %day, error = %error, "Reorder refused");
    })?;

    for block in &packed {
        schedule.insert(block.clone());
    }
    debug!(day = %day, blocks = packed.len(), "Day repacked");
    Ok(packed)
}

/// Moves `moved_id` into the slot currently held by `target_id` in the day's start-time
/// ordering, then repacks the day.
pub fn move_before(
    schedule: &mut Schedule,
    grid: &GridConfig,
    day: Day,
    moved_id: &str,
    target_id: &str,
) -> Result<Vec<ScheduledBlock>, Rejected> {
    let mut order = schedule
        .day_blocks(day)
        .into_iter()
        .map(|block| block.id.clone())
        .collect::<Vec<_>>();
    let Some(from) = order.iter().position(|id| id == moved_id) else {
        warn!(day = %day, block_id = %moved_id, "Move of block not on day");
        return Err(Rejected::InvalidReorder(format!("{moved_id} is not on {day}")));
    };
    let Some(to) = order.iter().position(|id| id == target_id) else {
        warn!(day = %day, block_id = %target_id, "Move onto block not on day");
        return Err(Rejected::InvalidReorder(format!("{target_id} is not on {day}")));
    };
    if from == to {
        return Ok(schedule.day_blocks(day).into_iter().cloned().collect());
    }

    let moved = order.remove(from);
    order.insert(to, moved);
    reorder(schedule, grid, day, &order)
}

/// Computes the repacked blocks without touching `schedule`.
fn plan_repack<S: AsRef<str>>(
    schedule: &Schedule,
    grid: &GridConfig,
    day: Day,
    order: &[S],
) -> Result<Vec<ScheduledBlock>, Rejected> {
    let day_blocks = schedule.day_blocks(day);
    if day_blocks.is_empty() {
        return Err(Rejected::InvalidReorder(format!("{day} has no blocks")));
    }
    if order.len() != day_blocks.len() {
        return Err(Rejected::InvalidReorder(format!(
            "expected {} block ids for {day}, got {}",
            day_blocks.len(),
            order.len()
        )));
    }

    let mut seen = HashSet::with_capacity(order.len());
    let mut cursor = 0_i64;
    let mut packed = Vec::with_capacity(order.len());
    for block_id in order {
        let block_id = block_id.as_ref();
        let Some(block) = day_blocks.iter().find(|block| block.id == block_id) else {
            return Err(Rejected::InvalidReorder(format!(
                "{block_id} is not scheduled on {day}"
            )));
        };
        if !seen.insert(block_id) {
            return Err(Rejected::InvalidReorder(format!("{block_id} listed twice")));
        }
        packed.push(ScheduledBlock {
            start_time: grid.from_grid_index(cursor),
            ..(*block).clone()
        });
        cursor += grid.block_span(block).steps;
    }
    Ok(packed)
}
