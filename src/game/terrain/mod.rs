//! Terrain Module
//!
//! Procedural bridge geometry.

pub mod bridge;

pub use bridge::{
    BridgeBlueprint, BuildReport, SuspensionBridgeConfig, VoxelSpec, build_into_grid,
    generate_suspension_bridge,
};

/// Water surface height; debris is removed once it drops below this.
pub const WATER_LEVEL: f32 = 0.0;
