// src/config.rs
//
// Every tunable of the simulation. All sections default to the reference
// racing behaviour, so an empty TOML file is a valid config.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::vehicle::ChassisLayout;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub world: WorldConfig,
    pub chassis: ChassisLayout,
    pub tuning: VehicleTuning,
    pub server: ServerConfig,
}

impl SimConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: SimConfig = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Rejects values the world stepper cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.world.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub gravity: [f32; 3],
    pub timestep: f32,      // s, fixed solver step
    pub max_substeps: usize,
}

impl WorldConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.timestep.is_finite() && self.timestep > 0.0) {
            return Err(ConfigError::Invalid {
                field: "world.timestep",
                reason: format!("must be a finite positive number of seconds (got {})", self.timestep),
            });
        }
        if self.max_substeps == 0 {
            return Err(ConfigError::Invalid {
                field: "world.max_substeps",
                reason: "must be at least 1".into(),
            });
        }
        if self.gravity.iter().any(|g| !g.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "world.gravity",
                reason: format!("must be finite (got {:?})", self.gravity),
            });
        }
        Ok(())
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -9.82, 0.0],
            timestep: 1.0 / 60.0,
            max_substeps: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub tick_hz: u32,
    pub max_players: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:9001".to_string(),
            tick_hz: 60,
            max_players: 8,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleTuning {
    pub drivetrain: DrivetrainTuning,
    pub steering: SteeringTuning,
    pub aero: AeroTuning,
    pub traction: TractionTuning,
    pub turbo: TurboTuning,
    pub thermal: ThermalTuning,
    pub effects: EffectTuning,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrivetrainTuning {
    pub idle_rpm: f32,
    pub rpm_range: f32,
    pub rpm_blend_rate: f32,     // 1/s
    pub engine_force_scale: f32,
    pub brake_force_scale: f32,
    pub display_speed_factor: f32, // m/s -> km/h
    pub upshift_above: f32,      // km/h
    pub downshift_below: f32,    // km/h
    pub speed_per_gear: f32,     // km/h
    pub gear_count: u8,
}

impl Default for DrivetrainTuning {
    fn default() -> Self {
        Self {
            idle_rpm: 800.0,
            rpm_range: 6000.0,
            rpm_blend_rate: 5.0,
            engine_force_scale: 20.0,
            brake_force_scale: 15.0,
            display_speed_factor: 3.6,
            upshift_above: 60.0,
            downshift_below: 30.0,
            speed_per_gear: 50.0,
            gear_count: 6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringTuning {
    pub deadzone: f32,
    pub full_authority_speed: f32, // m/s
    pub front_lateral_scale: f32,
}

impl Default for SteeringTuning {
    fn default() -> Self {
        Self {
            deadzone: 0.01,
            full_authority_speed: 10.0,
            front_lateral_scale: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AeroTuning {
    pub air_density: f32,      // kg/m^3
    pub drag_coefficient: f32,
    pub frontal_area: f32,     // m^2
    pub drag_min_speed: f32,   // m/s
    pub downforce_scale: f32,
}

impl Default for AeroTuning {
    fn default() -> Self {
        Self {
            air_density: 1.225,
            drag_coefficient: 0.3,
            frontal_area: 2.2,
            drag_min_speed: 1.0,
            downforce_scale: 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TractionTuning {
    pub abs_brake_threshold: f32,
    pub lock_ratio: f32,      // wheel surface speed / chassis speed
    pub release_factor: f32,  // brake multiplier per locked wheel
}

impl Default for TractionTuning {
    fn default() -> Self {
        Self {
            abs_brake_threshold: 0.8,
            lock_ratio: 0.1,
            release_factor: 0.8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurboTuning {
    pub throttle_threshold: f32,
    pub speed_threshold: f32, // km/h
    pub charge_per_tick: f32,
    pub decay_per_tick: f32,
}

impl Default for TurboTuning {
    fn default() -> Self {
        Self {
            throttle_threshold: 0.9,
            speed_threshold: 100.0,
            charge_per_tick: 0.02,
            decay_per_tick: 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermalTuning {
    pub initial_temp: f32,  // °C
    pub ambient_floor: f32, // °C
    pub thermal_max: f32,   // °C
    pub heat_rate: f32,     // °C per (m/s of sliding) per contact
    pub cooling_rate: f32,  // °C per contact
    pub cold_below: f32,
    pub overheated_above: f32,
    pub cold_grip: f32,
    pub optimal_grip: f32,
    pub overheated_grip: f32,
}

impl Default for ThermalTuning {
    fn default() -> Self {
        Self {
            initial_temp: 80.0,
            ambient_floor: 20.0,
            thermal_max: 150.0,
            heat_rate: 0.5,
            cooling_rate: 0.02,
            cold_below: 80.0,
            overheated_above: 120.0,
            cold_grip: 0.8,
            optimal_grip: 1.0,
            overheated_grip: 0.7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectTuning {
    pub smoke_min_sliding: f32, // m/s
    pub smoke_intensity: f32,
    pub dust_intensity: f32,
}

impl Default for EffectTuning {
    fn default() -> Self {
        Self {
            smoke_min_sliding: 2.0,
            smoke_intensity: 0.2,
            dust_intensity: 0.3,
        }
    }
}
