use crate::domain::catalog::{TemplateCatalog, TemplateDeletion, cascade_template_removal};
use crate::domain::error::Rejected;
use crate::domain::grid::{BlockLayout, GridConfig};
use crate::domain::models::{Day, ScheduledBlock};
use crate::domain::schedule::{DayLayoutEntry, Schedule};
use crate::domain::{placement, reorder, resize};

/// Entry points used by the grid renderer and the drag/drop layer.
///
/// The engine carries only its grid configuration; the schedule and catalog are owned
/// by the caller and passed into every call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulingEngine {
    grid: GridConfig,
}

impl SchedulingEngine {
    pub fn new(grid: GridConfig) -> Result<Self, String> {
        grid.validate()?;
        Ok(Self { grid })
    }

    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    pub fn place(
        &self,
        schedule: &mut Schedule,
        template_id: &str,
        day: Day,
        start_time: f64,
    ) -> Result<ScheduledBlock, Rejected> {
        placement::place(schedule, &self.grid, template_id, day, start_time)
    }

    pub fn resize(
        &self,
        schedule: &mut Schedule,
        block_id: &str,
        duration: f64,
    ) -> Result<ScheduledBlock, Rejected> {
        resize::resize(schedule, &self.grid, block_id, duration)
    }

    pub fn reorder<S: AsRef<str>>(
        &self,
        schedule: &mut Schedule,
        day: Day,
        order: &[S],
    ) -> Result<Vec<ScheduledBlock>, Rejected> {
        reorder::reorder(schedule, &self.grid, day, order)
    }

    /// Drag of one scheduled block onto another on the same day.
    pub fn move_block(
        &self,
        schedule: &mut Schedule,
        block_id: &str,
        over_block_id: &str,
    ) -> Result<Vec<ScheduledBlock>, Rejected> {
        let Some(day) = schedule.get(block_id).map(|block| block.day) else {
            return Err(Rejected::InvalidReorder(format!("{block_id} is not scheduled")));
        };
        reorder::move_before(schedule, &self.grid, day, block_id, over_block_id)
    }

    pub fn remove(&self, schedule: &mut Schedule, block_id: &str) -> bool {
        schedule.remove(block_id).is_some()
    }

    pub fn remove_template(
        &self,
        catalog: &mut TemplateCatalog,
        schedule: &mut Schedule,
        template_id: &str,
    ) -> Option<TemplateDeletion> {
        cascade_template_removal(catalog, schedule, template_id)
    }

    pub fn layout(&self, block: &ScheduledBlock) -> BlockLayout {
        self.grid.layout(block)
    }

    pub fn layout_day(
        &self,
        schedule: &Schedule,
        catalog: &TemplateCatalog,
        day: Day,
    ) -> Vec<DayLayoutEntry> {
        schedule.layout_day(day, catalog, &self.grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::default_templates;
    use crate::domain::overlap::intervals_overlap;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Operation {
        Place { day: usize, start: f64 },
        Resize { pick: usize, duration: f64 },
        Reverse { day: usize },
        Move { pick: usize, over: usize },
        Remove { pick: usize },
    }

    fn operation() -> impl Strategy<Value = Operation> {
        prop_oneof![
            (0usize..7, -2.0f64..26.0).prop_map(|(day, start)| Operation::Place { day, start }),
            (0usize..64, -1.0f64..8.0)
                .prop_map(|(pick, duration)| Operation::Resize { pick, duration }),
            (0usize..7).prop_map(|day| Operation::Reverse { day }),
            (0usize..64, 0usize..64).prop_map(|(pick, over)| Operation::Move { pick, over }),
            (0usize..64).prop_map(|pick| Operation::Remove { pick }),
        ]
    }

    fn pick_id(schedule: &Schedule, pick: usize) -> Option<String> {
        let blocks = schedule.sorted_blocks();
        if blocks.is_empty() {
            return None;
        }
        Some(blocks[pick % blocks.len()].id.clone())
    }

    fn assert_no_overlaps(schedule: &Schedule, grid: &GridConfig) -> Result<(), TestCaseError> {
        for day in Day::ALL {
            let blocks = schedule.day_blocks(day);
            for (index, left) in blocks.iter().enumerate() {
                let left_span = grid.block_span(left);
                prop_assert!(left_span.start >= 0);
                prop_assert!(left_span.end() <= grid.slot_count());
                for right in blocks.iter().skip(index + 1) {
                    prop_assert!(
                        !intervals_overlap(left_span, grid.block_span(right)),
                        "{} overlaps {}",
                        left.id,
                        right.id
                    );
                }
            }
        }
        Ok(())
    }

    #[test]
    fn engine_rejects_invalid_grid() {
        assert!(SchedulingEngine::new(GridConfig::with_unit_minutes(0)).is_err());
        assert!(SchedulingEngine::new(GridConfig::with_unit_minutes(30)).is_ok());
    }

    #[test]
    fn move_block_resolves_day_from_block() {
        let engine = SchedulingEngine::default();
        let mut schedule = Schedule::new();
        let first = engine
            .place(&mut schedule, "work", Day::Wednesday, 9.0)
            .expect("place");
        let second = engine
            .place(&mut schedule, "eat", Day::Wednesday, 12.0)
            .expect("place");

        let moved = engine
            .move_block(&mut schedule, &second.id, &first.id)
            .expect("move");
        assert_eq!(moved[0].id, second.id);
        assert_eq!(moved[0].start_time, 0.0);
        assert_eq!(moved[1].start_time, 1.0);

        assert!(matches!(
            engine.move_block(&mut schedule, "missing", &first.id),
            Err(Rejected::InvalidReorder(_))
        ));
    }

    #[test]
    fn remove_reports_whether_block_existed() {
        let engine = SchedulingEngine::default();
        let mut schedule = Schedule::new();
        let placed = engine
            .place(&mut schedule, "work", Day::Monday, 9.0)
            .expect("place");
        assert!(engine.remove(&mut schedule, &placed.id));
        assert!(!engine.remove(&mut schedule, &placed.id));
    }

    #[test]
    fn remove_template_cascades_and_hides_layouts() {
        let engine = SchedulingEngine::default();
        let mut catalog = TemplateCatalog::from_templates(default_templates()).expect("defaults");
        let mut schedule = Schedule::new();
        engine
            .place(&mut schedule, "work", Day::Monday, 9.0)
            .expect("place");
        engine
            .place(&mut schedule, "eat", Day::Monday, 12.0)
            .expect("place");
        assert_eq!(engine.layout_day(&schedule, &catalog, Day::Monday).len(), 2);

        let deletion = engine
            .remove_template(&mut catalog, &mut schedule, "work")
            .expect("template exists");
        assert_eq!(deletion.removed_block_ids.len(), 1);
        let remaining = engine.layout_day(&schedule, &catalog, Day::Monday);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].template_id, "eat");
    }

    proptest! {
        #[test]
        fn no_day_ever_overlaps_after_any_operation_sequence(
            operations in prop::collection::vec(operation(), 1..60),
            unit_index in 0usize..3,
        ) {
            let grid = GridConfig::with_unit_minutes([10, 30, 60][unit_index]);
            let engine = SchedulingEngine::new(grid).expect("valid grid");
            let mut schedule = Schedule::new();

            for operation in operations {
                match operation {
                    Operation::Place { day, start } => {
                        let _ = engine.place(&mut schedule, "work", Day::ALL[day], start);
                    }
                    Operation::Resize { pick, duration } => {
                        if let Some(block_id) = pick_id(&schedule, pick) {
                            let before = schedule.get(&block_id).cloned();
                            match engine.resize(&mut schedule, &block_id, duration) {
                                Ok(resized) => {
                                    prop_assert!(resized.duration >= grid.min_duration());
                                }
                                Err(_) => {
                                    prop_assert_eq!(schedule.get(&block_id).cloned(), before);
                                }
                            }
                        }
                    }
                    Operation::Reverse { day } => {
                        let day = Day::ALL[day];
                        let mut order = schedule
                            .day_blocks(day)
                            .into_iter()
                            .map(|block| block.id.clone())
                            .collect::<Vec<_>>();
                        order.reverse();
                        if let Ok(reordered) = engine.reorder(&mut schedule, day, &order) {
                            prop_assert_eq!(reordered[0].start_time, grid.day_start());
                        }
                    }
                    Operation::Move { pick, over } => {
                        if let (Some(block_id), Some(over_id)) =
                            (pick_id(&schedule, pick), pick_id(&schedule, over))
                        {
                            let _ = engine.move_block(&mut schedule, &block_id, &over_id);
                        }
                    }
                    Operation::Remove { pick } => {
                        if let Some(block_id) = pick_id(&schedule, pick) {
                            prop_assert!(engine.remove(&mut schedule, &block_id));
                        }
                    }
                }
                assert_no_overlaps(&schedule, &grid)?;
            }
        }
    }
}
