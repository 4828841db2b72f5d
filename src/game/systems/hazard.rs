//! Hazard seam
//!
//! Volcano, meteor shower and tornado share one trigger/update contract.
//! Hazards read the grid but never mutate it; destruction goes through the
//! event queue like any user explosion.

use glam::Vec3;
use rand::rngs::SmallRng;

use super::traffic::TrafficSimulator;
use crate::game::events::EventQueue;
use crate::world::VoxelGrid;

/// Everything a hazard may touch during one tick.
pub struct HazardContext<'a> {
    pub dt: f32,
    pub grid: &'a VoxelGrid,
    pub traffic: &'a mut TrafficSimulator,
    pub events: &'a mut EventQueue,
    pub rng: &'a mut SmallRng,
}

impl HazardContext<'_> {
    /// Height cars drive at.
    pub fn road_y(&self) -> f32 {
        self.traffic.layout().road_y
    }

    pub fn track_length(&self) -> f32 {
        self.traffic.layout().track_length
    }
}

pub trait Hazard {
    fn name(&self) -> &'static str;

    /// Start the hazard. A no-op while it is already active.
    fn trigger(&mut self, ctx: &mut HazardContext<'_>);

    fn is_active(&self) -> bool;

    /// Advance one tick. Does nothing while inactive.
    fn update(&mut self, ctx: &mut HazardContext<'_>);
}

/// A region cars and ships can run into.
pub trait HazardZone {
    /// `point` is inside the hazard's solid body.
    fn collides(&self, point: Vec3) -> bool;

    /// Some hot particle is within `radius` of `point`.
    fn lava_hits(&self, _point: Vec3, _radius: f32) -> bool {
        false
    }
}
