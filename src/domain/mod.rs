pub mod catalog;
pub mod engine;
pub mod error;
pub mod grid;
pub mod ids;
pub mod models;
pub mod overlap;
pub mod placement;
pub mod reorder;
pub mod resize;
pub mod schedule;
