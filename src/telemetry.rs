// src/telemetry.rs

use serde::Serialize;

use crate::dynamics::{GripBand, WheelId};
use crate::vehicle::VehicleId;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TireTemperatures {
    pub front_left: f32,
    pub front_right: f32,
    pub rear_left: f32,
    pub rear_right: f32,
}

impl TireTemperatures {
    /// Builds from an array indexed by `WheelId::index`.
    pub fn from_array(t: [f32; 4]) -> Self {
        Self {
            front_left: t[WheelId::FL.index()],
            front_right: t[WheelId::FR.index()],
            rear_left: t[WheelId::RL.index()],
            rear_right: t[WheelId::RR.index()],
        }
    }

    pub fn get(&self, wheel: WheelId) -> f32 {
        match wheel {
            WheelId::FL => self.front_left,
            WheelId::FR => self.front_right,
            WheelId::RL => self.rear_left,
            WheelId::RR => self.rear_right,
        }
    }

    pub fn to_array(&self) -> [f32; 4] {
        WheelId::ALL.map(|w| self.get(w))
    }
}

/// One vehicle's read-only state after a tick, as the renderer / HUD see it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleTelemetry {
    pub id: VehicleId,
    pub position: [f32; 3],
    pub rotation: [f32; 4], // quaternion [x, y, z, w]
    pub velocity: [f32; 3],
    pub speed: f32,         // display units (km/h)
    pub speed_fraction: f32, // speed over the car's top speed
    pub rpm: f32,
    pub gear: u8,
    pub turbo: f32,
    pub brake: f32,         // effective brake after ABS
    pub grip: f32,
    pub grip_band: GripBand,
    pub tire_temperatures: TireTemperatures,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tire_temperatures_follow_wheel_order() {
        let t = TireTemperatures::from_array([81.0, 82.0, 83.0, 84.0]);
        assert_eq!(t.front_right, 82.0);
        assert_eq!(t.get(WheelId::RL), 83.0);
        assert_eq!(t.to_array(), [81.0, 82.0, 83.0, 84.0]);
    }

    #[test]
    fn temperatures_serialize_with_readable_keys() {
        let t = TireTemperatures::from_array([80.0; 4]);
        let json = serde_json::to_value(t).unwrap();
        assert_eq!(json["rear_left"], 80.0);
    }
}
