//! Ships
//!
//! Cargo ships cruise the shipping lane under the bridge along z. An
//! explosion close by or the volcano cone sinks them; a sunk ship comes
//! back somewhere else once it has gone under.

use std::f32::consts::PI;

use glam::{EulerRot, Quat, Vec3};
use rand::Rng;

use crate::game::systems::HazardZone;
use crate::physics::within_radius;
use crate::render::{InstanceTransform, RenderChannel, RenderSink};

pub const SHIP_COUNT: usize = 5;
/// Ships wrap around at this |z|.
pub const SHIP_LANE_HALF_LENGTH: f32 = 1000.0;
pub const SHIP_CRUISE_Y: f32 = -10.0;
pub const SINK_SPEED: f32 = 20.0;
/// Sunk ships respawn below this.
pub const SUNK_Y: f32 = -150.0;
/// Extra reach of an explosion against a ship hull.
pub const HULL_MARGIN: f32 = 20.0;
/// Speed a released ship resumes at.
const RELEASE_SPEED: f32 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Ship {
    pub position: Vec3,
    pub speed: f32,
    /// +1 or -1 along z
    pub dir: f32,
    pub sinking: bool,
    pub pitch: f32,
    pub roll: f32,
    pub grabbed: bool,
}

impl Ship {
    fn random<R: Rng>(rng: &mut R) -> Self {
        Self {
            position: Vec3::new(
                rng.random_range(-1000.0..1000.0),
                SHIP_CRUISE_Y,
                rng.random_range(-1000.0..1000.0),
            ),
            speed: rng.random_range(5.0..10.0),
            dir: if rng.random_bool(0.5) { 1.0 } else { -1.0 },
            sinking: false,
            pitch: 0.0,
            roll: 0.0,
            grabbed: false,
        }
    }

    fn refloat<R: Rng>(&mut self, rng: &mut R) {
        self.position = Vec3::new(
            rng.random_range(-1000.0..1000.0),
            SHIP_CRUISE_Y,
            rng.random_range(-1500.0..1500.0),
        );
        self.sinking = false;
        self.pitch = 0.0;
        self.roll = 0.0;
    }

    pub fn rotation(&self) -> Quat {
        let yaw = if self.dir >= 0.0 { 0.0 } else { PI };
        Quat::from_euler(EulerRot::YXZ, yaw, self.pitch, self.roll)
    }
}

#[derive(Debug, Default)]
pub struct ShipFleet {
    ships: Vec<Ship>,
    time: f32,
    sunk_total: u64,
}

impl ShipFleet {
    pub fn new<R: Rng>(count: usize, rng: &mut R) -> Self {
        Self {
            ships: (0..count).map(|_| Ship::random(rng)).collect(),
            time: 0.0,
            sunk_total: 0,
        }
    }

    pub fn update<R: Rng>(&mut self, dt: f32, zone: Option<&dyn HazardZone>, rng: &mut R) {
        self.time += dt;
        for ship in self.ships.iter_mut().filter(|s| !s.grabbed) {
            if ship.sinking {
                ship.position.y -= SINK_SPEED * dt;
                ship.pitch += 0.5 * dt;
                ship.roll += 0.2 * dt;
                if ship.position.y < SUNK_Y {
                    ship.refloat(rng);
                }
                continue;
            }

            ship.position.z += ship.dir * ship.speed * dt;
            if ship.position.z > SHIP_LANE_HALF_LENGTH {
                ship.position.z = -SHIP_LANE_HALF_LENGTH;
            } else if ship.position.z < -SHIP_LANE_HALF_LENGTH {
                ship.position.z = SHIP_LANE_HALF_LENGTH;
            }
            ship.position.y = SHIP_CRUISE_Y + (self.time + ship.position.x).sin();

            if zone.is_some_and(|z| z.collides(ship.position)) {
                ship.sinking = true;
                self.sunk_total += 1;
            }
        }
    }

    /// Start sinking every afloat ship within `radius + HULL_MARGIN` of
    /// `center`. Returns the positions of the ships hit.
    pub fn sink_within(&mut self, center: Vec3, radius: f32) -> Vec<Vec3> {
        let mut hit = Vec::new();
        for ship in self.ships.iter_mut().filter(|s| !s.sinking) {
            if within_radius(ship.position, center, radius + HULL_MARGIN) {
                ship.sinking = true;
                hit.push(ship.position);
            }
        }
        self.sunk_total += hit.len() as u64;
        hit
    }

    pub fn grab(&mut self, i: usize) -> bool {
        match self.ships.get_mut(i) {
            Some(ship) => {
                ship.grabbed = true;
                true
            }
            None => false,
        }
    }

    pub fn drag(&mut self, i: usize, point: Vec3, rate: f32) {
        if let Some(ship) = self.ships.get_mut(i).filter(|s| s.grabbed) {
            ship.position = ship.position.lerp(point, rate.min(1.0));
        }
    }

    /// Put a held ship back to work.
    pub fn release(&mut self, i: usize) {
        if let Some(ship) = self.ships.get_mut(i).filter(|s| s.grabbed) {
            ship.grabbed = false;
            ship.sinking = false;
            ship.pitch = 0.0;
            ship.roll = 0.0;
            ship.speed = RELEASE_SPEED;
        }
    }

    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    pub fn sunk_total(&self) -> u64 {
        self.sunk_total
    }

    pub fn emit(&self, sink: &mut impl RenderSink) {
        for (i, ship) in self.ships.iter().enumerate() {
            sink.set_transform(
                RenderChannel::Ship,
                i as u32,
                InstanceTransform::visible(ship.position, ship.rotation()),
            );
        }
    }
}
