// ==============================================================================
// traction.rs — ABS LOCK-UP HEURISTIC
// ==============================================================================
// Only active above the brake threshold. Each wheel whose surface speed
// (|ω|·r) is below lock_ratio * chassis speed counts as locked and scales the
// brake by release_factor. Per-tick only: the requested brake input is left
// untouched, and the result can only be <= the request.
// ==============================================================================

use crate::config::TractionTuning;
use crate::dynamics::types::{VehicleKinematics, WheelId};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbsOutcome {
    pub brake: f32,
    pub locked: [bool; 4],
}

impl AbsOutcome {
    pub fn locked_count(&self) -> usize {
        self.locked.iter().filter(|l| **l).count()
    }
}

pub fn is_locked(wheel_surface_speed: f32, chassis_speed: f32, cfg: &TractionTuning) -> bool {
    wheel_surface_speed < chassis_speed * cfg.lock_ratio
}

pub fn apply_abs(requested_brake: f32, kin: &VehicleKinematics, cfg: &TractionTuning) -> AbsOutcome {
    let mut out = AbsOutcome { brake: requested_brake, locked: [false; 4] };
    if requested_brake <= cfg.abs_brake_threshold {
        return out;
    }

    let chassis_speed = kin.speed();
    for id in WheelId::ALL {
        if is_locked(kin.wheel_surface_speed[id.index()], chassis_speed, cfg) {
            out.locked[id.index()] = true;
            out.brake *= cfg.release_factor;
        }
    }
    out
}
