use crate::domain::error::Rejected;
use crate::domain::grid::{GridConfig, format_clock};
use crate::domain::models::ScheduledBlock;
use crate::domain::overlap::{Candidate, find_conflict};
use crate::domain::schedule::Schedule;
use tracing::debug;

/// Changes a block's duration, keeping its start.
///
/// The requested duration is raised to one grid unit, snapped, and capped at the day
/// end. A resize that would collide with a neighbour is refused outright; the block is
/// never shrunk to fit.
///
/// `requested_duration` must be finite; callers reject NaN and infinities at the input
/// boundary.
pub fn resize(
    schedule: &mut Schedule,
    grid: &GridConfig,
    block_id: &str,
    requested_duration: f64,
) -> Result<ScheduledBlock, Rejected> {
    debug_assert!(requested_duration.is_finite(), "resize duration must be finite");
    let Some(current) = schedule.get(block_id) else {
        return Err(Rejected::UnknownBlock(block_id.to_string()));
    };
    let start_index = grid.to_grid_index(current.start_time);
    let steps = grid.clamp_steps(start_index, grid.steps(requested_duration));
    let duration = grid.duration_from_steps(steps);

    let candidate = Candidate {
        day: current.day,
        start_time: current.start_time,
        duration,
        exclude_id: Some(block_id),
    };
    if let Some(conflict) = find_conflict(&candidate, schedule.iter(), grid) {
        debug!(
            block_id = %block_id,
            requested = requested_duration,
            conflict = %conflict.id,
            "Resize rejected"
        );
        return Err(Rejected::Overlap);
    }

    let Some(block) = schedule.get_mut(block_id) else {
        return Err(Rejected::UnknownBlock(block_id.to_string()));
    };
    block.duration = duration;
    debug!(
        block_id = %block_id,
        start = %format_clock(block.start_time),
        end = %format_clock(block.end_time()),
        "Block resized"
    );
    Ok(block.clone())
}
