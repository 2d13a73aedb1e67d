// src/vehicle.rs

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SpecError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(pub Uuid);

impl VehicleId {
    pub fn generate() -> Self {
        VehicleId(Uuid::new_v4())
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vehicle_{}", self.0.simple())
    }
}

fn default_acceleration() -> f32 { 0.03 }
fn default_brake_force() -> f32 { 0.9 }
fn default_turn() -> f32 { 0.06 }
fn default_downforce() -> f32 { 0.3 }

/// Externally supplied car data. `mass` and `max_speed` are mandatory when
/// deserializing; the ratings fall back to the reference car's values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleSpec {
    pub mass: f32,                 // kg
    pub max_speed: f32,            // m/s
    #[serde(default = "default_acceleration")]
    pub acceleration_rating: f32,
    #[serde(default = "default_brake_force")]
    pub brake_force_rating: f32,
    #[serde(default = "default_turn")]
    pub turn_rating: f32,
    #[serde(default = "default_downforce")]
    pub downforce_rating: f32,
}

impl VehicleSpec {
    pub fn from_json(text: &str) -> Result<Self, SpecError> {
        let spec: VehicleSpec =
            serde_json::from_str(text).map_err(|e| SpecError::Parse(e.to_string()))?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> Result<(), SpecError> {
        let fields = [
            ("mass", self.mass),
            ("max_speed", self.max_speed),
            ("acceleration_rating", self.acceleration_rating),
            ("brake_force_rating", self.brake_force_rating),
            ("turn_rating", self.turn_rating),
            ("downforce_rating", self.downforce_rating),
        ];
        for (field, value) in fields {
            if !(value.is_finite() && value > 0.0) {
                return Err(SpecError::NotPositive { field, value });
            }
        }
        Ok(())
    }
}

// --------------------------------------------------
// Catalog (top speeds given in km/h, stored in m/s)
// --------------------------------------------------

pub const SPORT_COUPE: VehicleSpec = VehicleSpec {
    mass: 1200.0,
    max_speed: 320.0 / 3.6,
    acceleration_rating: 0.028,
    brake_force_rating: 0.95,
    turn_rating: 0.06,
    downforce_rating: 0.3,
};

pub const FORMULA_X1: VehicleSpec = VehicleSpec {
    mass: 700.0,
    max_speed: 380.0 / 3.6,
    acceleration_rating: 0.035,
    brake_force_rating: 0.98,
    turn_rating: 0.08,
    downforce_rating: 0.8,     // big wings
};

pub const THUNDER_MUSCLE: VehicleSpec = VehicleSpec {
    mass: 1600.0,
    max_speed: 350.0 / 3.6,
    acceleration_rating: 0.032,
    brake_force_rating: 0.88,
    turn_rating: 0.045,
    downforce_rating: 0.1,
};

pub const APEX_HYPERCAR: VehicleSpec = VehicleSpec {
    mass: 1400.0,
    max_speed: 360.0 / 3.6,
    acceleration_rating: 0.033,
    brake_force_rating: 0.92,
    turn_rating: 0.07,
    downforce_rating: 0.5,
};

pub const CATALOG: [(&str, VehicleSpec); 4] = [
    ("sport_coupe", SPORT_COUPE),
    ("formula_x1", FORMULA_X1),
    ("thunder_muscle", THUNDER_MUSCLE),
    ("apex_hypercar", APEX_HYPERCAR),
];

pub fn catalog_spec(name: &str) -> Option<VehicleSpec> {
    CATALOG.iter().find(|(n, _)| *n == name).map(|(_, s)| *s)
}

/// Physical layout shared by every car: hull box, virtual CG and wheel mounts.
/// Chassis space is +z forward, +x right, +y up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChassisLayout {
    pub half_extents: [f32; 3],  // [hx, hy, hz] meters
    pub com_offset: [f32; 3],    // centre of mass relative to the hull centre
    pub spawn_lift: f32,         // chassis spawns this far above the requested point
    pub wheel_radius: f32,
    pub wheel_mass: f32,
    pub wheel_anchor: [f32; 3],  // |x|, y, |z| of the FR mount; others are mirrored
}

impl Default for ChassisLayout {
    fn default() -> Self {
        Self {
            half_extents: [1.0, 0.3, 2.0],
            com_offset: [0.0, -0.2, 0.0],
            spawn_lift: 0.5,
            wheel_radius: 0.35,
            wheel_mass: 50.0,
            wheel_anchor: [1.0, -0.2, 1.2],
        }
    }
}
