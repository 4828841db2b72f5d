//! Ambient Population
//!
//! Ships, birds and pedestrians. None of them affect the bridge; ships are
//! the only ones that react to hazards.

pub mod birds;
pub mod pedestrians;
pub mod ships;

pub use birds::{BIRD_COUNT, Bird, Flock};
pub use pedestrians::{Crowd, Pedestrian, PedestrianArea, WalkAxis};
pub use ships::{SHIP_COUNT, Ship, ShipFleet};

use rand::Rng;

use crate::game::systems::HazardZone;
use crate::render::RenderSink;

/// Everything alive around the bridge that is not traffic.
#[derive(Debug, Default)]
pub struct Population {
    pub ships: ShipFleet,
    pub birds: Flock,
    pub crowd: Crowd,
}

impl Population {
    /// Ships only spawn where the scenario has a shipping lane.
    pub fn new<R: Rng>(
        shipping_lane: bool,
        pedestrian_areas: Vec<PedestrianArea>,
        pedestrian_count: usize,
        rng: &mut R,
    ) -> Self {
        let ship_count = if shipping_lane { SHIP_COUNT } else { 0 };
        Self {
            ships: ShipFleet::new(ship_count, rng),
            birds: Flock::new(BIRD_COUNT, rng),
            crowd: Crowd::new(pedestrian_areas, pedestrian_count, rng),
        }
    }

    pub fn update<R: Rng>(&mut self, dt: f32, zone: Option<&dyn HazardZone>, rng: &mut R) {
        self.ships.update(dt, zone, rng);
        self.birds.update(dt, rng);
        self.crowd.update(dt);
    }

    pub fn emit(&self, sink: &mut impl RenderSink) {
        self.ships.emit(sink);
        self.birds.emit(sink);
        self.crowd.emit(sink);
    }
}
