//! Depth-first, memoized materialization of plan graphs.

pub mod executor;

pub use executor::{ExecuteStats, PlanExecutor};
