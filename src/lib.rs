//! Vehicle dynamics core for a headless racing server: rapier rigid-body
//! world, surface materials, per-car force pipeline and the engine that
//! ties them together each tick.

pub mod config;
pub mod controller;
pub mod dynamics;
pub mod effects;
pub mod engine;
pub mod error;
pub mod logging;
pub mod materials;
pub mod spawn;
pub mod telemetry;
pub mod track;
pub mod vehicle;
pub mod world;

pub use config::SimConfig;
pub use controller::VehicleController;
pub use engine::{Eviction, PhysicsEngine, TickReport};
pub use error::{EngineError, VehicleError};
pub use vehicle::{VehicleId, VehicleSpec};
