//! Scenarios
//!
//! A scenario decides what gets built into the grid, what holds the deck
//! up, where traffic drives and who else is around.

pub mod city_block;
pub mod golden_bridge;

pub use city_block::CityBlockScenario;
pub use golden_bridge::GoldenBridgeScenario;

use crate::game::config::{ScenarioKind, TrafficLayout};
use crate::game::physics::AnchorPredicate;
use crate::game::population::PedestrianArea;
use crate::game::terrain::BuildReport;
use crate::world::{GridError, VoxelGrid};

pub trait Scenario {
    fn name(&self) -> &'static str;

    /// Insert the scenario's destructible voxels into an empty grid.
    fn build(&self, grid: &mut VoxelGrid) -> Result<BuildReport, GridError>;

    fn anchors(&self) -> AnchorPredicate;

    fn traffic_layout(&self) -> TrafficLayout;

    fn pedestrian_areas(&self) -> Vec<PedestrianArea> {
        Vec::new()
    }

    fn pedestrian_count(&self) -> usize {
        0
    }

    /// Ships only sail where there is water under the road.
    fn has_shipping_lane(&self) -> bool;
}

impl ScenarioKind {
    pub fn instantiate(self) -> Box<dyn Scenario> {
        match self {
            ScenarioKind::GoldenBridge => Box::new(GoldenBridgeScenario::default()),
            ScenarioKind::CityBlock => Box::new(CityBlockScenario),
        }
    }
}
