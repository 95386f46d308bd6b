use crate::domain::error::Rejected;
use crate::domain::grid::{GridConfig, format_clock};
use crate::domain::models::{Day, ScheduledBlock};
use crate::domain::overlap::{Candidate, find_conflict};
use crate::domain::schedule::Schedule;
use tracing::debug;

/// Drops a new block of the default duration at `requested_start`.
///
/// The start is snapped to the grid and pulled back inside the day so the new block
/// never runs past the day end. An overlap rejects the drop and leaves `schedule`
/// untouched.
///
/// `requested_start` must be finite; callers reject NaN and infinities at the input
/// boundary.
pub fn place(
    schedule: &mut Schedule,
    grid: &GridConfig,
    template_id: &str,
    day: Day,
    requested_start: f64,
) -> Result<ScheduledBlock, Rejected> {
    debug_assert!(requested_start.is_finite(), "placement start must be finite");
    let steps = grid.default_steps();
    let start_index = grid.clamp_start_index(grid.to_grid_index(requested_start), steps);
    let start_time = grid.from_grid_index(start_index);
    let duration = grid.duration_from_steps(steps);

    let candidate = Candidate {
        day,
        start_time,
        duration,
        exclude_id: None,
    };
    if let Some(conflict) = find_conflict(&candidate, schedule.iter(), grid) {
        debug!(
            template_id = %template_id,
            day = %day,
            start = %format_clock(start_time),
            conflict = %conflict.id,
            "Placement rejected"
        );
        return Err(Rejected::Overlap);
    }

    let block = ScheduledBlock {
        id: schedule.fresh_block_id(),
        template_id: template_id.to_string(),
        day,
        start_time,
        duration,
    };
    schedule.insert(block.clone());
    debug!(
        block_id = %block.id,
        day = %day,
        start = %format_clock(start_time),
        end = %format_clock(block.end_time()),
        "Block placed"
    );
    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::overlap::has_overlap;

    fn monday_nine_to_eleven(grid: &GridConfig) -> Schedule {
        Schedule::from_blocks(
            vec![ScheduledBlock {
                id: "existing".to_string(),
                template_id: "work".to_string(),
                day: Day::Monday,
                start_time: 9.0,
                duration: 2.0,
            }],
            grid,
        )
        .expect("valid schedule")
    }

    #[test]
    fn place_inside_existing_block_is_rejected() {
        let grid = GridConfig::default();
        let mut schedule = monday_nine_to_eleven(&grid);
        let result = place(&mut schedule, &grid, "eat", Day::Monday, 10.0);
        assert_eq!(result, Err(Rejected::Overlap));
        assert_eq!(schedule.len(), 1);
    }

    #[test]
    fn place_touching_boundary_succeeds() {
        let grid = GridConfig::default();
        let mut schedule = monday_nine_to_eleven(&grid);
        let placed = place(&mut schedule, &grid, "eat", Day::Monday, 11.0).expect("placed");
        assert_eq!(placed.start_time, 11.0);
        assert_eq!(placed.duration, 1.0);
        assert_eq!(placed.template_id, "eat");
        assert_eq!(schedule.get(&placed.id), Some(&placed));
        assert_eq!(schedule.len(), 2);
    }

    #[test]
    fn place_ending_at_existing_start_succeeds() {
        let grid = GridConfig::default();
        let mut schedule = monday_nine_to_eleven(&grid);
        let placed = place(&mut schedule, &grid, "eat", Day::Monday, 8.0).expect("placed");
        assert_eq!(placed.end_time(), 9.0);
    }

    #[test]
    fn place_snaps_requested_start() {
        let grid = GridConfig::with_unit_minutes(30);
        let mut schedule = Schedule::new();
        let placed = place(&mut schedule, &grid, "work", Day::Friday, 13.2).expect("placed");
        assert_eq!(placed.start_time, 13.0);
        let later = place(&mut schedule, &grid, "work", Day::Friday, 14.3).expect("placed");
        assert_eq!(later.start_time, 14.5);
    }

    #[test]
    fn place_keeps_block_inside_the_day() {
        let grid = GridConfig::default();
        let mut schedule = Schedule::new();
        let placed = place(&mut schedule, &grid, "sleep", Day::Sunday, 23.7).expect("placed");
        assert_eq!(placed.start_time, 23.0);
        assert_eq!(placed.end_time(), 24.0);
        assert!(placed.validate().is_ok());
    }

    #[test]
    fn place_uses_single_unit_when_hour_is_not_representable() {
        let grid = GridConfig::with_unit_minutes(45);
        let mut schedule = Schedule::new();
        let placed = place(&mut schedule, &grid, "work", Day::Monday, 9.0).expect("placed");
        assert_eq!(placed.duration, 0.75);
    }

    #[test]
    fn other_days_do_not_block_placement() {
        let grid = GridConfig::default();
        let mut schedule = monday_nine_to_eleven(&grid);
        let placed = place(&mut schedule, &grid, "eat", Day::Tuesday, 10.0).expect("placed");
        assert_eq!(placed.day, Day::Tuesday);
        let candidate = Candidate {
            day: Day::Tuesday,
            start_time: 10.0,
            duration: 1.0,
            exclude_id: Some(placed.id.as_str()),
        };
        assert!(!has_overlap(&candidate, schedule.iter(), &grid));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "placement start must be finite")]
    fn non_finite_start_is_a_caller_bug() {
        let grid = GridConfig::default();
        let mut schedule = Schedule::new();
        let _ = place(&mut schedule, &grid, "work", Day::Monday, f64::NAN);
    }
}
