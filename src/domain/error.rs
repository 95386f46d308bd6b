use thiserror::Error;

/// Outcome of an engine operation that was refused. No state is written when one of
/// these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejected {
    #[error("block would overlap another block on the same day")]
    Overlap,
    #[error("invalid reorder: {0}")]
    InvalidReorder(String),
    #[error("block not found: {0}")]
    UnknownBlock(String),
}
