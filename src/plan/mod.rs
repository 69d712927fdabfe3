//! Named composition operations and their on-disk store.

pub mod model;
pub mod store;

pub use model::{ClipSource, Plan, PlanName, PlanOp, is_perfect_square, validate_stack_count};
pub use store::PlanStore;
