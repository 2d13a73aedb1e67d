// src/error.rs

use std::path::PathBuf;

use thiserror::Error;

use crate::materials::SurfaceId;
use crate::vehicle::VehicleId;

/// Rejected `VehicleSpec` values. Raised before any body is created.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpecError {
    #[error("vehicle spec field `{field}` must be a finite positive number (got {value})")]
    NotPositive { field: &'static str, value: f32 },

    #[error("vehicle spec could not be parsed: {0}")]
    Parse(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MaterialError {
    #[error("surface material `{0}` is already registered")]
    Duplicate(String),

    #[error("surface id {0:?} is not registered")]
    Unknown(SurfaceId),

    #[error("contact coefficient `{field}` must be finite and >= 0 (got {value})")]
    InvalidCoefficient { field: &'static str, value: f32 },

    #[error("surface table is full ({0} materials)")]
    TableFull(usize),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum VehicleError {
    /// The controller was destroyed; the caller still holds a stale handle.
    #[error("vehicle {0} was destroyed and cannot be used")]
    Destroyed(VehicleId),

    /// One of the controller's bodies disappeared from the world behind its back.
    #[error("vehicle {vehicle} lost {missing} from the rigid-body world")]
    WorldDesync { vehicle: VehicleId, missing: &'static str },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config field `{field}` is invalid: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown vehicle {0}")]
    UnknownVehicle(VehicleId),

    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error(transparent)]
    Material(#[from] MaterialError),

    #[error(transparent)]
    Vehicle(#[from] VehicleError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
