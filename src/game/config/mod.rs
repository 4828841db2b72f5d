//! Config Module
//!
//! Run configuration and the traffic layout contract between scenarios
//! and the traffic simulator.

pub mod sim_config;

pub use sim_config::{
    ConfigError, LaneSpec, SPEED_MULTIPLIER_RANGE, ScenarioKind, SimConfig, TrafficLayout,
};
