use crate::domain::grid::{GridConfig, Span};
use crate::domain::models::{Day, ScheduledBlock};

/// A placement or resize under consideration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate<'a> {
    pub day: Day,
    pub start_time: f64,
    pub duration: f64,
    /// The block being resized or moved, which must not collide with itself.
    pub exclude_id: Option<&'a str>,
}

/// Half-open intersection test. Touching endpoints do not overlap.
pub fn intervals_overlap(left: Span, right: Span) -> bool {
    left.start < right.end() && right.start < left.end()
}

/// First block on the candidate's day whose interval intersects the candidate.
pub fn find_conflict<'b, I>(
    candidate: &Candidate<'_>,
    existing: I,
    grid: &GridConfig,
) -> Option<&'b ScheduledBlock>
where
    I: IntoIterator<Item = &'b ScheduledBlock>,
{
    let span = grid.span_of(candidate.start_time, candidate.duration);
    existing
        .into_iter()
        .filter(|block| block.day == candidate.day)
        .filter(|block| candidate.exclude_id != Some(block.id.as_str()))
        .find(|block| intervals_overlap(span, grid.block_span(block)))
}

pub fn has_overlap<'b, I>(candidate: &Candidate<'_>, existing: I, grid: &GridConfig) -> bool
where
    I: IntoIterator<Item = &'b ScheduledBlock>,
{
    find_conflict(candidate, existing, grid).is_some()
}
