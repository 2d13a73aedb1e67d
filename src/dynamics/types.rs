//! Core shared types for the vehicle force pipeline (no rigid-body access).
// dynamics/types.rs
use std::fmt;

use rapier3d::prelude::{Real, Vector};
use serde::Serialize;

use crate::config::VehicleTuning;
use crate::vehicle::VehicleSpec;

// ============================================
// Wheel identification
// ============================================

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub enum WheelId { FL, FR, RL, RR }

impl WheelId {
    pub const ALL: [WheelId; 4] = [WheelId::FL, WheelId::FR, WheelId::RL, WheelId::RR];

    pub fn index(self) -> usize {
        match self {
            WheelId::FL => 0,
            WheelId::FR => 1,
            WheelId::RL => 2,
            WheelId::RR => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WheelId::FL => "FL",
            WheelId::FR => "FR",
            WheelId::RL => "RL",
            WheelId::RR => "RR",
        }
    }

    pub fn is_front(&self) -> bool {
        matches!(self, WheelId::FL | WheelId::FR)
    }

    pub fn is_rear(&self) -> bool {
        matches!(self, WheelId::RL | WheelId::RR)
    }

    pub fn is_left(&self) -> bool {
        matches!(self, WheelId::FL | WheelId::RL)
    }
}

impl fmt::Display for WheelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================
// ----- inputs -------------------------------
// ============================================

/// Driver input. Always stored clamped: throttle/brake in [0,1], steering in [-1,1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ControlInput {
    pub throttle: f32,
    pub brake: f32,
    pub steering: f32,
}

#[inline]
fn clamp_finite(v: f32, lo: f32, hi: f32) -> f32 {
    if v.is_finite() { v.clamp(lo, hi) } else { 0.0 }
}

impl ControlInput {
    /// Out-of-range values are clamped; NaN/inf collapse to zero.
    pub fn clamped(throttle: f32, brake: f32, steering: f32) -> Self {
        Self {
            throttle: clamp_finite(throttle, 0.0, 1.0),
            brake: clamp_finite(brake, 0.0, 1.0),
            steering: clamp_finite(steering, -1.0, 1.0),
        }
    }
}

/// Everything the pipeline needs to know about the vehicle this tick,
/// sampled from the world right after the world step.
#[derive(Debug, Clone, Copy)]
pub struct VehicleKinematics {
    pub forward: Vector<Real>, // chassis +z in world space
    pub right: Vector<Real>,   // chassis +x in world space
    pub up: Vector<Real>,      // world up
    pub linvel: Vector<Real>,  // chassis linear velocity (m/s)
    /// `|ω|·radius` per wheel, indexed by `WheelId::index`.
    pub wheel_surface_speed: [f32; 4],
}

impl VehicleKinematics {
    pub fn at_rest() -> Self {
        Self {
            forward: Vector::z(),
            right: Vector::x(),
            up: Vector::y(),
            linvel: Vector::zeros(),
            wheel_surface_speed: [0.0; 4],
        }
    }

    pub fn speed(&self) -> f32 {
        self.linvel.magnitude()
    }
}

/// Stateful engine outputs carried from one tick to the next.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PowertrainState {
    pub engine_rpm: f32,
    pub gear: u8,
    pub turbo_boost: f32,
}

impl PowertrainState {
    pub fn idle(idle_rpm: f32) -> Self {
        Self { engine_rpm: idle_rpm, gear: 1, turbo_boost: 0.0 }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SolveContext<'a> {
    pub dt: f32,           // s
    pub spec: &'a VehicleSpec,
    pub tuning: &'a VehicleTuning,
    /// Steering grip scalar from the thermal model.
    pub grip: f32,
}

// ============================================
// ----- force output -------------------------
// ============================================

/// World-space forces for one tick. Wheel forces act at the wheel centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForcePlan {
    pub chassis_force: Vector<Real>,
    pub chassis_torque: Vector<Real>,
    pub wheel_forces: [Vector<Real>; 4],
}

impl Default for ForcePlan {
    fn default() -> Self {
        Self {
            chassis_force: Vector::zeros(),
            chassis_torque: Vector::zeros(),
            wheel_forces: [Vector::zeros(); 4],
        }
    }
}

impl ForcePlan {
    pub fn wheel(id: WheelId, force: Vector<Real>) -> Self {
        let mut plan = Self::default();
        plan.wheel_forces[id.index()] = force;
        plan
    }

    pub fn chassis(force: Vector<Real>) -> Self {
        Self { chassis_force: force, ..Self::default() }
    }

    pub fn add(&mut self, other: &ForcePlan) {
        self.chassis_force += other.chassis_force;
        self.chassis_torque += other.chassis_torque;
        for (w, o) in self.wheel_forces.iter_mut().zip(other.wheel_forces.iter()) {
            *w += *o;
        }
    }

    /// Sum of every linear force, wherever it is applied.
    pub fn net_force(&self) -> Vector<Real> {
        self.wheel_forces.iter().fold(self.chassis_force, |acc, f| acc + f)
    }
}
