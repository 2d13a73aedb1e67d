// ==============================================================================
// aero.rs — QUADRATIC DRAG + DOWNFORCE ON THE CHASSIS
// ==============================================================================
//   drag      = 0.5 * rho * Cd * A * v^2   (opposes velocity, only above min speed)
//   downforce = rating * v^2 * scale        (straight down at the chassis centre)
//
// Downforce is a force; it never touches the grip multiplier.
// ==============================================================================

use rapier3d::prelude::{Real, Vector};

use crate::config::AeroTuning;
use crate::dynamics::types::{ForcePlan, VehicleKinematics};
use crate::vehicle::VehicleSpec;

pub fn drag_magnitude(speed: f32, cfg: &AeroTuning) -> f32 {
    0.5 * cfg.air_density * cfg.drag_coefficient * cfg.frontal_area * speed * speed
}

pub fn drag_force(kin: &VehicleKinematics, cfg: &AeroTuning) -> ForcePlan {
    let speed = kin.speed();
    // Below the threshold the velocity direction is too noisy to normalise.
    if speed <= cfg.drag_min_speed {
        return ForcePlan::default();
    }
    let dir: Vector<Real> = -kin.linvel / speed;
    ForcePlan::chassis(dir * drag_magnitude(speed, cfg))
}

pub fn downforce_magnitude(speed: f32, spec: &VehicleSpec, cfg: &AeroTuning) -> f32 {
    spec.downforce_rating * speed * speed * cfg.downforce_scale
}

pub fn downforce(kin: &VehicleKinematics, spec: &VehicleSpec, cfg: &AeroTuning) -> ForcePlan {
    let amount = downforce_magnitude(kin.speed(), spec, cfg);
    ForcePlan::chassis(-kin.up * amount)
}
