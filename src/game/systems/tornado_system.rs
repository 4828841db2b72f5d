//! Tornado hazard.
//!
//! A funnel crosses the bridge on a straight path. Driving cars inside its
//! radius get a small per-tick chance of being picked up; the traffic
//! simulator spirals them around the funnel center. When the tornado dies,
//! every captured car is thrown clear on that same tick.

use glam::{Quat, Vec3};
use rand::Rng;

use super::hazard::{Hazard, HazardContext};
use super::traffic::TrafficSimulator;
use crate::physics::within_radius_xz;
use crate::render::{InstanceTransform, RenderChannel, RenderSink};

pub const TORNADO_SPEED: f32 = 40.0;
pub const TORNADO_RADIUS: f32 = 60.0;
/// Seconds before the funnel dissipates even mid-path.
pub const TORNADO_LIFETIME: f32 = 30.0;
/// Per-tick chance an eligible car is picked up.
pub const CAPTURE_CHANCE: f32 = 0.05;
/// The path runs from -z to +z across the deck.
const PATH_HALF_SPAN: f32 = 500.0;
/// Cars further than this above or below the road are out of reach.
const CAPTURE_HEIGHT: f32 = 30.0;

#[derive(Debug, Default)]
pub struct TornadoSystem {
    position: Vec3,
    end_z: f32,
    active: bool,
    elapsed: f32,
    /// Funnel spin, cosmetic
    twist: f32,
    total_captures: u64,
}

impl TornadoSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Funnel base while active.
    pub fn center(&self) -> Option<Vec3> {
        self.active.then_some(self.position)
    }

    pub fn total_captures(&self) -> u64 {
        self.total_captures
    }

    /// End the tornado now and throw every captured car clear.
    /// Returns how many cars were released.
    pub fn deactivate(&mut self, traffic: &mut TrafficSimulator) -> usize {
        if !self.active {
            return 0;
        }
        self.active = false;
        let released = traffic.release_captured();
        tracing::info!(released, elapsed = self.elapsed, "tornado dissipated");
        released
    }

    pub fn emit(&self, sink: &mut impl RenderSink) {
        let transform = if self.active {
            InstanceTransform::new(
                self.position,
                Quat::from_rotation_y(self.twist),
                Vec3::new(TORNADO_RADIUS, 200.0, TORNADO_RADIUS),
            )
        } else {
            InstanceTransform::hidden()
        };
        sink.set_transform(RenderChannel::Tornado, 0, transform);
    }
}

impl Hazard for TornadoSystem {
    fn name(&self) -> &'static str {
        "tornado"
    }

    fn trigger(&mut self, ctx: &mut HazardContext<'_>) {
        if self.active {
            return;
        }
        let half = ctx.track_length() * 0.5 * 0.9;
        let x = if half > 0.0 { ctx.rng.random_range(-half..half) } else { 0.0 };
        self.position = Vec3::new(x, ctx.road_y(), -PATH_HALF_SPAN);
        self.end_z = PATH_HALF_SPAN;
        self.elapsed = 0.0;
        self.active = true;
        tracing::info!(x, "tornado touched down");
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn update(&mut self, ctx: &mut HazardContext<'_>) {
        if !self.active {
            return;
        }
        let dt = ctx.dt;
        self.elapsed += dt;
        self.position.z += TORNADO_SPEED * dt;
        self.twist += 3.0 * dt;
        if self.position.z >= self.end_z || self.elapsed >= TORNADO_LIFETIME {
            self.deactivate(ctx.traffic);
            return;
        }

        let center = self.position;
        let road_y = ctx.road_y();
        let eligible: Vec<usize> = ctx
            .traffic
            .cars()
            .iter()
            .enumerate()
            .filter(|(_, c)| {
                c.active
                    && c.is_driving()
                    && (c.position.y - road_y).abs() < CAPTURE_HEIGHT
                    && within_radius_xz(c.position, center, TORNADO_RADIUS)
            })
            .map(|(i, _)| i)
            .collect();
        for i in eligible {
            if ctx.rng.random::<f32>() < CAPTURE_CHANCE && ctx.traffic.capture(i, center, ctx.rng) {
                self.total_captures += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::game::events::EventQueue;
    use crate::game::systems::hazard::test_support;
    use crate::world::{GridConfig, VoxelGrid};

    #[test]
    fn test_crosses_the_path_then_dissipates() {
        let grid = VoxelGrid::new(GridConfig::default());
        let mut rng = SmallRng::seed_from_u64(23);
        let mut traffic = test_support::traffic(0, &grid, &mut rng);
        let mut events = EventQueue::new();
        let mut tornado = TornadoSystem::new();
        let mut ctx = HazardContext {
            dt: 0.1,
            grid: &grid,
            traffic: &mut traffic,
            events: &mut events,
            rng: &mut rng,
        };
        tornado.trigger(&mut ctx);
        let start = tornado.center().expect("active");
        assert_eq!(start.z, -PATH_HALF_SPAN);
        assert_eq!(start.y, 69.0);

        let mut ticks = 0;
        while tornado.is_active() {
            tornado.update(&mut ctx);
            ticks += 1;
            assert!(ticks <= 300);
        }
        // 1000 units at 40/s
        assert!((249..=251).contains(&ticks));
        assert!(tornado.center().is_none());
    }

    #[test]
    fn test_picks_up_cars_inside_the_funnel() {
        let grid = VoxelGrid::new(GridConfig::default());
        let mut rng = SmallRng::seed_from_u64(23);
        let mut traffic = test_support::traffic(20, &grid, &mut rng);
        let mut events = EventQueue::new();
        let mut tornado = TornadoSystem::new();
        {
            let mut ctx = HazardContext {
                dt: 0.1,
                grid: &grid,
                traffic: &mut traffic,
                events: &mut events,
                rng: &mut rng,
            };
            tornado.trigger(&mut ctx);
        }
        let center = tornado.center().expect("active");
        for i in 0..20 {
            if let Some(car) = traffic.car_mut(i) {
                car.position = Vec3::new(center.x + i as f32, 69.0, center.z + 30.0);
            }
        }
        {
            let mut ctx = HazardContext {
                dt: 0.1,
                grid: &grid,
                traffic: &mut traffic,
                events: &mut events,
                rng: &mut rng,
            };
            for _ in 0..10 {
                tornado.update(&mut ctx);
            }
        }
        assert!(tornado.total_captures() > 0);
        assert_eq!(traffic.captured_count() as u64, tornado.total_captures());
    }

    #[test]
    fn test_deactivation_releases_captured_cars_at_once() {
        let grid = VoxelGrid::new(GridConfig::default());
        let mut rng = SmallRng::seed_from_u64(23);
        let mut traffic = test_support::traffic(3, &grid, &mut rng);
        let mut events = EventQueue::new();
        let mut tornado = TornadoSystem::new();
        {
            let mut ctx = HazardContext {
                dt: 0.1,
                grid: &grid,
                traffic: &mut traffic,
                events: &mut events,
                rng: &mut rng,
            };
            tornado.trigger(&mut ctx);
        }
        assert!(tornado.center().is_some());
        let car_pos = traffic.cars()[0].position;
        traffic.capture(0, car_pos + Vec3::new(-20.0, 0.0, 0.0), &mut rng);
        assert_eq!(traffic.captured_count(), 1);

        assert_eq!(tornado.deactivate(&mut traffic), 1);
        assert!(!tornado.is_active());
        let car = &traffic.cars()[0];
        assert!(car.is_falling());
        assert!(car.velocity.x > 0.0);
        assert_eq!(tornado.deactivate(&mut traffic), 0);
    }
}
