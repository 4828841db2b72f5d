//! City Block
//!
//! A street on solid ground: no destructible voxels, four lanes, and
//! sidewalks on both sides.

use glam::Vec3;

use super::Scenario;
use crate::game::config::{LaneSpec, TrafficLayout};
use crate::game::physics::AnchorPredicate;
use crate::game::population::{PedestrianArea, WalkAxis};
use crate::game::terrain::BuildReport;
use crate::world::{GridError, VoxelGrid};

pub const CITY_CAR_COUNT: usize = 100;
pub const CITY_TRACK_LENGTH: f32 = 1200.0;
pub const CITY_ROAD_Y: f32 = 52.0;
pub const CITY_PEDESTRIANS: usize = 50;

#[derive(Debug, Clone, Copy, Default)]
pub struct CityBlockScenario;

impl Scenario for CityBlockScenario {
    fn name(&self) -> &'static str {
        "city block"
    }

    fn build(&self, _grid: &mut VoxelGrid) -> Result<BuildReport, GridError> {
        Ok(BuildReport::default())
    }

    fn anchors(&self) -> AnchorPredicate {
        AnchorPredicate::none()
    }

    fn traffic_layout(&self) -> TrafficLayout {
        TrafficLayout {
            car_count: CITY_CAR_COUNT,
            track_length: CITY_TRACK_LENGTH,
            road_y: CITY_ROAD_Y,
            ground_check: false,
            lanes: vec![
                LaneSpec::new(30.0, 1),
                LaneSpec::new(10.0, 1),
                LaneSpec::new(-10.0, -1),
                LaneSpec::new(-30.0, -1),
            ],
        }
    }

    fn pedestrian_areas(&self) -> Vec<PedestrianArea> {
        [140.0, -140.0]
            .into_iter()
            .map(|z| PedestrianArea {
                center: Vec3::new(0.0, 53.0, z),
                width: CITY_TRACK_LENGTH,
                length: 60.0,
                axis: WalkAxis::X,
            })
            .collect()
    }

    fn pedestrian_count(&self) -> usize {
        CITY_PEDESTRIANS
    }

    fn has_shipping_lane(&self) -> bool {
        false
    }
}
