// ==============================================================================
// solve.rs — ONE TICK OF THE VEHICLE FORCE PIPELINE
// ==============================================================================
// Stage order is fixed:
//   1) traction / ABS  -> effective brake for this tick
//   2) drivetrain      -> rpm, gear, drive + brake forces
//   3) steering        -> yaw torque + front turn-in forces
//   4) aero drag
//   5) downforce
//   6) turbo charge / decay
// Each stage contributes a ForcePlan; contributions are summed once and the
// caller hands the total to the rigid-body world. Nothing here touches bodies.
// ==============================================================================

use crate::dynamics::aero::{downforce, drag_force};
use crate::dynamics::drivetrain::{drivetrain_forces, next_gear, next_rpm, next_turbo};
use crate::dynamics::steering::steering_forces;
use crate::dynamics::traction::{AbsOutcome, apply_abs};
use crate::dynamics::types::{
    ControlInput, ForcePlan, PowertrainState, SolveContext, VehicleKinematics,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSolution {
    pub forces: ForcePlan,
    pub powertrain: PowertrainState,
    pub abs: AbsOutcome,
    /// Chassis speed in display units (km/h by default).
    pub display_speed: f32,
}

pub fn solve_tick(
    ctx: &SolveContext,
    input: &ControlInput,
    kin: &VehicleKinematics,
    prev: &PowertrainState,
) -> TickSolution {
    let tuning = ctx.tuning;
    let display_speed = kin.speed() * tuning.drivetrain.display_speed_factor;

    // 1) ABS
    let abs = apply_abs(input.brake, kin, &tuning.traction);

    // 2) Engine
    let engine_rpm = next_rpm(prev.engine_rpm, input.throttle, ctx.dt, &tuning.drivetrain);
    let gear = next_gear(prev.gear, display_speed, &tuning.drivetrain);

    let mut forces = ForcePlan::default();
    let stages = [
        drivetrain_forces(input, abs.brake, kin, ctx.spec, &tuning.drivetrain),
        steering_forces(input, ctx.grip, kin, ctx.spec, &tuning.steering),
        drag_force(kin, &tuning.aero),
        downforce(kin, ctx.spec, &tuning.aero),
    ];
    for stage in &stages {
        forces.add(stage);
    }

    // 6) Turbo
    let turbo_boost = next_turbo(prev.turbo_boost, input.throttle, display_speed, &tuning.turbo);

    TickSolution {
        forces,
        powertrain: PowertrainState { engine_rpm, gear, turbo_boost },
        abs,
        display_speed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VehicleTuning;
    use crate::vehicle::SPORT_COUPE;
    use rapier3d::prelude::Vector;

    fn ctx(tuning: &VehicleTuning) -> SolveContext<'_> {
        SolveContext {
            dt: 1.0 / 60.0,
            spec: &SPORT_COUPE,
            tuning,
            grip: 1.0,
        }
    }

    #[test]
    fn idle_car_at_rest_produces_no_force() {
        let tuning = VehicleTuning::default();
        let sol = solve_tick(
            &ctx(&tuning),
            &ControlInput::default(),
            &VehicleKinematics::at_rest(),
            &PowertrainState::idle(800.0),
        );
        assert_eq!(sol.forces.net_force(), Vector::zeros());
        assert_eq!(sol.powertrain, PowertrainState::idle(800.0));
    }

    #[test]
    fn abs_release_reaches_the_brake_forces() {
        let tuning = VehicleTuning::default();
        let mut kin = VehicleKinematics::at_rest();
        kin.linvel = Vector::new(0.0, 0.0, 50.0);

        let input = ControlInput::clamped(0.0, 0.9, 0.0);
        let sol = solve_tick(&ctx(&tuning), &input, &kin, &PowertrainState::idle(800.0));
        assert!(sol.abs.brake <= 0.9 * 0.8);
        assert_eq!(sol.abs.locked_count(), 4);

        // Less braking than the unmodulated request would give.
        let requested = crate::dynamics::drivetrain::brake_force(0.9, &SPORT_COUPE, &tuning.drivetrain);
        let braking: f32 = sol.forces.wheel_forces.iter().map(|f| -f.z).sum();
        assert!(braking < requested);
    }

    #[test]
    fn display_speed_feeds_gear_and_turbo() {
        let tuning = VehicleTuning::default();
        let mut kin = VehicleKinematics::at_rest();
        kin.linvel = Vector::new(0.0, 0.0, 40.0); // 144 km/h
        kin.wheel_surface_speed = [40.0; 4];

        let input = ControlInput::clamped(1.0, 0.0, 0.0);
        let sol = solve_tick(&ctx(&tuning), &input, &kin, &PowertrainState::idle(800.0));
        assert!((sol.display_speed - 144.0).abs() < 1e-3);
        assert_eq!(sol.powertrain.gear, 3);
        assert!(sol.powertrain.turbo_boost > 0.0);
    }
}
