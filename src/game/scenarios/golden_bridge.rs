//! Golden Bridge
//!
//! The suspension bridge over open water: a destructible deck spanning the
//! whole track, static towers and cables, six lanes and a shipping lane
//! underneath.

use super::Scenario;
use crate::game::config::{LaneSpec, TrafficLayout};
use crate::game::physics::AnchorPredicate;
use crate::game::terrain::{
    BuildReport, SuspensionBridgeConfig, build_into_grid, generate_suspension_bridge,
};
use crate::world::{GridError, VoxelGrid};

pub const BRIDGE_CAR_COUNT: usize = 400;
/// Cars ride on top of the road layer.
pub const BRIDGE_ROAD_Y: f32 = 69.0;

#[derive(Debug, Clone, Default)]
pub struct GoldenBridgeScenario {
    pub bridge: SuspensionBridgeConfig,
}

impl Scenario for GoldenBridgeScenario {
    fn name(&self) -> &'static str {
        "golden bridge"
    }

    fn build(&self, grid: &mut VoxelGrid) -> Result<BuildReport, GridError> {
        build_into_grid(&generate_suspension_bridge(&self.bridge), grid)
    }

    fn anchors(&self) -> AnchorPredicate {
        AnchorPredicate::golden_bridge()
    }

    fn traffic_layout(&self) -> TrafficLayout {
        TrafficLayout {
            car_count: BRIDGE_CAR_COUNT,
            track_length: self.bridge.deck_length,
            road_y: BRIDGE_ROAD_Y,
            ground_check: true,
            // Three lanes each way, 10 apart
            lanes: (0..6)
                .map(|lane| {
                    let z = (lane as f32 - 2.5) * 10.0;
                    LaneSpec::new(z, if z < 0.0 { 1 } else { -1 })
                })
                .collect(),
        }
    }

    fn has_shipping_lane(&self) -> bool {
        true
    }
}
