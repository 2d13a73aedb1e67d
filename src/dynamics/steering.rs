// ==============================================================================
// steering.rs — YAW TORQUE + FRONT TURN-IN FORCE
// ==============================================================================
// steer_term = steering * turn_rating * grip * min(1, speed / full_authority_speed)
//
// - chassis torque about world up:  steer_term * mass
// - lateral force per front wheel:  chassis right * steer_term * mass * scale
//
// The speed factor keeps the car from pivoting in place. `grip` is the single
// thermal scalar; there is no per-wheel steering response.
// ==============================================================================

use crate::config::SteeringTuning;
use crate::dynamics::types::{ControlInput, ForcePlan, VehicleKinematics, WheelId};
use crate::vehicle::VehicleSpec;

pub fn speed_factor(speed: f32, cfg: &SteeringTuning) -> f32 {
    if cfg.full_authority_speed <= 0.0 {
        return 1.0;
    }
    (speed / cfg.full_authority_speed).clamp(0.0, 1.0)
}

pub fn steering_forces(
    input: &ControlInput,
    grip: f32,
    kin: &VehicleKinematics,
    spec: &VehicleSpec,
    cfg: &SteeringTuning,
) -> ForcePlan {
    if input.steering.abs() <= cfg.deadzone {
        return ForcePlan::default();
    }

    let steer_term =
        input.steering * spec.turn_rating * grip * speed_factor(kin.speed(), cfg);

    let mut plan = ForcePlan {
        chassis_torque: kin.up * (steer_term * spec.mass),
        ..ForcePlan::default()
    };

    let lateral = kin.right * (steer_term * spec.mass * cfg.front_lateral_scale);
    for id in [WheelId::FL, WheelId::FR] {
        plan.wheel_forces[id.index()] += lateral;
    }

    plan
}
