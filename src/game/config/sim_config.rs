//! Simulation Configuration
//!
//! Runtime knobs for a simulation run plus the traffic layout a scenario
//! hands to the traffic simulator. Loaded from JSON; every field has a
//! default so partial files are accepted.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Range accepted for the global speed multiplier.
pub const SPEED_MULTIPLIER_RANGE: std::ops::RangeInclusive<f32> = 0.1..=10.0;

/// Which scene to build on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ScenarioKind {
    /// Voxelised suspension bridge over water
    #[default]
    GoldenBridge,
    /// Street grid on a rock plateau, no destructible ground
    CityBlock,
}

/// One traffic lane: a constant-z row driven in one direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneSpec {
    /// Lateral offset of the lane (world z)
    pub z: f32,
    /// Driving direction along x, +1 or -1
    pub dir: i8,
}

impl LaneSpec {
    pub const fn new(z: f32, dir: i8) -> Self {
        Self { z, dir }
    }

    #[inline]
    pub fn sign(&self) -> f32 {
        if self.dir < 0 { -1.0 } else { 1.0 }
    }
}

/// Traffic layout supplied by a scenario.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrafficLayout {
    /// Size of the car pool
    pub car_count: usize,
    /// Track length along x; positions wrap at +/- length/2
    pub track_length: f32,
    /// Height cars drive at
    pub road_y: f32,
    /// Whether cars fall through holes in the voxel grid
    pub ground_check: bool,
    pub lanes: Vec<LaneSpec>,
}

impl TrafficLayout {
    pub fn half_length(&self) -> f32 {
        self.track_length * 0.5
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Top-level configuration for a [`Simulation`](crate::game::Simulation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Fraction of the car pool that is driving, in [0, 1]
    pub traffic_density: f32,
    /// Global speed multiplier; crashes explode above 2.0
    pub speed_multiplier: f32,
    /// Fog density in [0, 100]; drives distraction odds
    pub fog_density: f32,
    /// Seed for the simulation RNG
    pub seed: u64,
    pub scenario: ScenarioKind,
    /// Replaces the scenario's own traffic layout when set
    pub traffic_override: Option<TrafficLayout>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            traffic_density: 0.5,
            speed_multiplier: 1.0,
            fog_density: 2.0,
            seed: 0x00b1_d9e5,
            scenario: ScenarioKind::GoldenBridge,
            traffic_override: None,
        }
    }
}

impl SimConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject out-of-range values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.traffic_density) {
            return Err(ConfigError::invalid(
                "traffic_density",
                format!("{} is outside [0, 1]", self.traffic_density),
            ));
        }
        if !SPEED_MULTIPLIER_RANGE.contains(&self.speed_multiplier) {
            return Err(ConfigError::invalid(
                "speed_multiplier",
                format!(
                    "{} is outside [{}, {}]",
                    self.speed_multiplier,
                    SPEED_MULTIPLIER_RANGE.start(),
                    SPEED_MULTIPLIER_RANGE.end()
                ),
            ));
        }
        if !(0.0..=100.0).contains(&self.fog_density) {
            return Err(ConfigError::invalid(
                "fog_density",
                format!("{} is outside [0, 100]", self.fog_density),
            ));
        }
        if let Some(layout) = &self.traffic_override {
            if !(layout.track_length.is_finite() && layout.track_length > 0.0) {
                return Err(ConfigError::invalid(
                    "traffic_override.track_length",
                    "must be positive",
                ));
            }
            if layout.lanes.is_empty() && layout.car_count > 0 {
                return Err(ConfigError::invalid(
                    "traffic_override.lanes",
                    "cars need at least one lane",
                ));
            }
            if let Some(lane) = layout.lanes.iter().find(|l| l.dir != 1 && l.dir != -1) {
                return Err(ConfigError::invalid(
                    "traffic_override.lanes",
                    format!("lane at z={} has direction {}", lane.z, lane.dir),
                ));
            }
        }
        Ok(())
    }
}
