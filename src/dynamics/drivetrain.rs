// ==============================================================================
// drivetrain.rs — ENGINE RPM, GEAR ESTIMATE, DRIVE + BRAKE FORCES, TURBO
// ==============================================================================
// - RPM chases a throttle-proportional target with a bounded blend
//   (rpm += (target - rpm) * min(1, rate*dt)), so large dt cannot overshoot.
// - Gear is a stateless function of display speed, only re-evaluated outside
//   the 30..60 km/h band. No hysteresis: it may flip near the thresholds.
// - Drive force goes to the rear pair (RWD); brake force to all four wheels.
// ==============================================================================

use rapier3d::prelude::{Real, Vector};

use crate::config::{DrivetrainTuning, TurboTuning};
use crate::dynamics::types::{ControlInput, ForcePlan, VehicleKinematics, WheelId};
use crate::vehicle::VehicleSpec;

pub fn next_rpm(current: f32, throttle: f32, dt: f32, cfg: &DrivetrainTuning) -> f32 {
    let target = cfg.idle_rpm + throttle * cfg.rpm_range;
    let blend = (cfg.rpm_blend_rate * dt.max(0.0)).min(1.0);
    current + (target - current) * blend
}

/// `floor(speed / per_gear) + 1`, clamped to the gearbox.
pub fn gear_for_speed(speed_kmh: f32, cfg: &DrivetrainTuning) -> u8 {
    let raw = (speed_kmh.max(0.0) / cfg.speed_per_gear).floor() + 1.0;
    raw.clamp(1.0, cfg.gear_count.max(1) as f32) as u8
}

pub fn next_gear(current: u8, speed_kmh: f32, cfg: &DrivetrainTuning) -> u8 {
    if speed_kmh > cfg.upshift_above && current < cfg.gear_count {
        gear_for_speed(speed_kmh, cfg)
    } else if speed_kmh < cfg.downshift_below && current > 1 {
        gear_for_speed(speed_kmh, cfg)
    } else {
        current
    }
}

pub fn next_turbo(current: f32, throttle: f32, speed_kmh: f32, cfg: &TurboTuning) -> f32 {
    if throttle > cfg.throttle_threshold && speed_kmh > cfg.speed_threshold {
        (current + cfg.charge_per_tick).min(1.0)
    } else {
        (current - cfg.decay_per_tick).max(0.0)
    }
}

pub fn engine_force(throttle: f32, spec: &VehicleSpec, cfg: &DrivetrainTuning) -> f32 {
    throttle * spec.acceleration_rating * spec.mass * cfg.engine_force_scale
}

pub fn brake_force(brake: f32, spec: &VehicleSpec, cfg: &DrivetrainTuning) -> f32 {
    brake * spec.brake_force_rating * spec.mass * cfg.brake_force_scale
}

/// Drive + brake contributions. `brake` is the effective (post-ABS) value.
pub fn drivetrain_forces(
    input: &ControlInput,
    brake: f32,
    kin: &VehicleKinematics,
    spec: &VehicleSpec,
    cfg: &DrivetrainTuning,
) -> ForcePlan {
    let mut plan = ForcePlan::default();
    let forward: Vector<Real> = kin.forward;

    // -------------------------
    // ENGINE (rear pair)
    // -------------------------
    if input.throttle > 0.0 {
        let per_wheel = engine_force(input.throttle, spec, cfg) / 2.0;
        for id in [WheelId::RL, WheelId::RR] {
            plan.wheel_forces[id.index()] += forward * per_wheel;
        }
    }

    // -------------------------
    // BRAKE (all four, against chassis forward; also the reverse gear)
    // -------------------------
    if brake > 0.0 {
        let per_wheel = brake_force(brake, spec, cfg) / 4.0;
        for f in plan.wheel_forces.iter_mut() {
            *f -= forward * per_wheel;
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::SPORT_COUPE;
    use approx::assert_relative_eq;

    #[test]
    fn rpm_blend_never_overshoots_for_large_dt() {
        let cfg = DrivetrainTuning::default();
        let rpm = next_rpm(800.0, 1.0, 10.0, &cfg);
        assert_relative_eq!(rpm, 6800.0);

        let half = next_rpm(800.0, 1.0, 0.1, &cfg);
        assert_relative_eq!(half, 800.0 + 6000.0 * 0.5);
    }

    #[test]
    fn gear_formula_is_clamped() {
        let cfg = DrivetrainTuning::default();
        assert_eq!(gear_for_speed(0.0, &cfg), 1);
        assert_eq!(gear_for_speed(49.9, &cfg), 1);
        assert_eq!(gear_for_speed(65.0, &cfg), 2);
        assert_eq!(gear_for_speed(149.0, &cfg), 3);
        assert_eq!(gear_for_speed(900.0, &cfg), 6);
    }

    #[test]
    fn gear_holds_inside_the_dead_band() {
        let cfg = DrivetrainTuning::default();
        assert_eq!(next_gear(3, 45.0, &cfg), 3);
        assert_eq!(next_gear(1, 45.0, &cfg), 1);
    }

    #[test]
    fn gear_can_drop_from_the_upshift_branch() {
        // Coming down from 200 km/h in 5th: at 70 km/h the formula says 2nd.
        let cfg = DrivetrainTuning::default();
        assert_eq!(next_gear(5, 70.0, &cfg), 2);
        assert_eq!(next_gear(6, 70.0, &cfg), 6);
    }

    #[test]
    fn brake_pushes_backwards_at_rest_and_in_reverse() {
        let cfg = DrivetrainTuning::default();
        let input = ControlInput::clamped(0.0, 1.0, 0.0);
        let per_wheel = brake_force(1.0, &SPORT_COUPE, &cfg) / 4.0;
        assert_relative_eq!(per_wheel, 4275.0);

        let mut kin = VehicleKinematics::at_rest();
        for vz in [0.0, -5.0] {
            kin.linvel = Vector::new(0.0, 0.0, vz);
            let plan = drivetrain_forces(&input, 1.0, &kin, &SPORT_COUPE, &cfg);
            for f in plan.wheel_forces {
                assert_relative_eq!(f, Vector::new(0.0, 0.0, -per_wheel));
            }
        }
    }

    #[test]
    fn drive_goes_to_rear_wheels_only() {
        let cfg = DrivetrainTuning::default();
        let input = ControlInput::clamped(1.0, 0.0, 0.0);
        let plan = drivetrain_forces(&input, 0.0, &VehicleKinematics::at_rest(), &SPORT_COUPE, &cfg);

        let total = engine_force(1.0, &SPORT_COUPE, &cfg);
        assert_relative_eq!(plan.wheel_forces[WheelId::RL.index()].z, total / 2.0);
        assert_relative_eq!(plan.wheel_forces[WheelId::RR.index()].z, total / 2.0);
        assert_eq!(plan.wheel_forces[WheelId::FL.index()], Vector::zeros());
        assert_eq!(plan.wheel_forces[WheelId::FR.index()], Vector::zeros());
    }

    #[test]
    fn brake_opposes_travel_on_every_wheel() {
        let cfg = DrivetrainTuning::default();
        let mut kin = VehicleKinematics::at_rest();
        kin.linvel = Vector::new(0.0, 0.0, 20.0);
        let input = ControlInput::clamped(0.0, 0.5, 0.0);
        let plan = drivetrain_forces(&input, 0.5, &kin, &SPORT_COUPE, &cfg);

        let per_wheel = brake_force(0.5, &SPORT_COUPE, &cfg) / 4.0;
        for f in plan.wheel_forces {
            assert_relative_eq!(f.z, -per_wheel);
        }
    }

    #[test]
    fn turbo_charges_and_decays_within_bounds() {
        let cfg = TurboTuning::default();
        assert_relative_eq!(next_turbo(0.0, 1.0, 150.0, &cfg), 0.02);
        assert_relative_eq!(next_turbo(0.995, 1.0, 150.0, &cfg), 1.0);
        assert_relative_eq!(next_turbo(0.5, 0.5, 150.0, &cfg), 0.49, epsilon = 1e-6);
        assert_relative_eq!(next_turbo(0.005, 1.0, 50.0, &cfg), 0.0);
    }
}
