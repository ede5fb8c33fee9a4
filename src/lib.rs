pub mod error;
pub mod geometry;
pub mod host;
pub mod math;
pub mod mesh;
pub mod operations;
pub mod planner;
pub mod store;

pub use error::{PlannerError, Result};
pub use planner::{PlanOutput, Planner, PlannerConfig};
