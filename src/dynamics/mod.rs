//! dynamics - engine-agnostic vehicle force models (pure types + per-tick pipeline)

pub mod types;
pub mod drivetrain;
pub mod steering;
pub mod aero;
pub mod traction;
pub mod thermal;
pub mod solve;

pub use types::*;
pub use thermal::{GripBand, TireThermalModel, grip_multiplier};
pub use solve::{TickSolution, solve_tick};
