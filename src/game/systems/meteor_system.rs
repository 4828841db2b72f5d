//! Meteor shower hazard.
//!
//! Owns the active meteors and the shower clock. Meteors aim at random
//! deck points; each impact becomes an explosion event, so a meteor breaks
//! the bridge through exactly the same path as a user explosion.

use glam::Vec3;
use rand::Rng;

use super::hazard::{Hazard, HazardContext};
use crate::game::destruction::Meteor;
use crate::game::events::ExplosionRequest;
use crate::game::terrain::WATER_LEVEL;
use crate::render::{InstanceTransform, RenderChannel, RenderSink};

/// Seconds the shower keeps spawning.
pub const SHOWER_DURATION: f32 = 20.0;
/// Seconds between spawns.
pub const SPAWN_INTERVAL: f32 = 0.8;
/// Cap on meteors in flight.
pub const MAX_METEORS: usize = 12;
/// Half-width of the target strip across the deck.
const TARGET_HALF_WIDTH: f32 = 35.0;

/// Manages the full lifecycle of a meteor shower.
#[derive(Debug, Default)]
pub struct MeteorSystem {
    meteors: Vec<Meteor>,
    active: bool,
    elapsed: f32,
    spawn_timer: f32,
    total_impacts: u64,
    /// Slots written by the previous emit
    emitted: usize,
}

impl MeteorSystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn spawn(&mut self, ctx: &mut HazardContext<'_>) {
        let half = ctx.track_length() * 0.5 * 0.9;
        let x = if half > 0.0 { ctx.rng.random_range(-half..half) } else { 0.0 };
        let z = ctx.rng.random_range(-TARGET_HALF_WIDTH..TARGET_HALF_WIDTH);
        let y = ctx.grid.ground_top_at(x, z).unwrap_or(WATER_LEVEL);
        self.meteors.push(Meteor::new(Vec3::new(x, y, z), ctx.rng));
    }

    pub fn iter(&self) -> impl Iterator<Item = &Meteor> {
        self.meteors.iter()
    }

    /// Number of meteors in flight.
    pub fn count(&self) -> usize {
        self.meteors.len()
    }

    pub fn total_impacts(&self) -> u64 {
        self.total_impacts
    }

    /// Fireball transforms; slots left over from the last emit are hidden.
    pub fn emit(&mut self, sink: &mut impl RenderSink) {
        for (i, m) in self.meteors.iter().enumerate() {
            let transform = InstanceTransform::new(m.body.position, m.spin.quat(), Vec3::splat(m.size));
            sink.set_transform(RenderChannel::Meteor, i as u32, transform);
        }
        for i in self.meteors.len()..self.emitted {
            sink.set_transform(RenderChannel::Meteor, i as u32, InstanceTransform::hidden());
        }
        self.emitted = self.meteors.len();
    }

    pub fn clear(&mut self) {
        self.meteors.clear();
        self.active = false;
    }
}

impl Hazard for MeteorSystem {
    fn name(&self) -> &'static str {
        "meteor shower"
    }

    fn trigger(&mut self, _ctx: &mut HazardContext<'_>) {
        if self.active {
            return;
        }
        self.active = true;
        self.elapsed = 0.0;
        self.spawn_timer = 0.0;
        tracing::info!(duration = SHOWER_DURATION, "meteor shower started");
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

        if self.elapsed < SHOWER_DURATION {
            self.spawn_timer -= dt;
            if self.spawn_timer <= 0.0 && self.meteors.len() < MAX_METEORS {
                self.spawn(ctx);
                self.spawn_timer = SPAWN_INTERVAL;
            }
        }

        let grid = ctx.grid;
        let surface = |x: f32, z: f32| grid.ground_top_at(x, z).unwrap_or(WATER_LEVEL);
        for meteor in &mut self.meteors {
            if let Some(impact) = meteor.update(dt, surface) {
                ctx.events.explode(ExplosionRequest::meteor(impact));
                self.total_impacts += 1;
            }
        }
        self.meteors.retain(|m| m.is_alive());

        // Stays active until the last meteor in flight has landed
        if self.elapsed >= SHOWER_DURATION && self.meteors.is_empty() {
            self.active = false;
            tracing::info!(impacts = self.total_impacts, "meteor shower ended");
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::game::events::{EventQueue, SimEvent};
    use crate::game::systems::hazard::test_support;
    use crate::game::terrain::{SuspensionBridgeConfig, build_into_grid, generate_suspension_bridge};
    use crate::game::config::TrafficLayout;
    use crate::game::systems::traffic::TrafficSimulator;
    use crate::world::{GridConfig, VoxelGrid};

    #[test]
    fn test_shower_rains_explosions_then_ends() {
        let mut grid = VoxelGrid::new(GridConfig::default());
        build_into_grid(&generate_suspension_bridge(&SuspensionBridgeConfig::default()), &mut grid)
            .expect("build");
        let mut rng = SmallRng::seed_from_u64(13);
        let mut traffic = test_support::traffic(0, &grid, &mut rng);
        let mut events = EventQueue::new();
        let mut shower = MeteorSystem::new();

        let mut explosions = 0;
        let mut ticks = 0;
        {
            let mut ctx = HazardContext {
                dt: 0.1,
                grid: &grid,
                traffic: &mut traffic,
                events: &mut events,
                rng: &mut rng,
            };
            shower.trigger(&mut ctx);
            shower.trigger(&mut ctx);
            while shower.is_active() {
                shower.update(&mut ctx);
                assert!(shower.count() <= MAX_METEORS);
                explosions += ctx
                    .events
                    .drain()
                    .into_iter()
                    .filter(|e| matches!(e, SimEvent::Explosion(r) if r.force_radius == 80.0))
                    .count();
                ticks += 1;
                assert!(ticks < 400, "shower never ended");
            }
        }
        assert!(ticks >= 200);
        assert!(explosions > 0);
        assert_eq!(explosions as u64, shower.total_impacts());
    }

    #[test]
    fn test_inactive_shower_does_nothing() {
        let grid = VoxelGrid::new(GridConfig::default());
        let mut rng = SmallRng::seed_from_u64(13);
        let mut traffic = test_support::traffic(0, &grid, &mut rng);
        let mut events = EventQueue::new();
        let mut shower = MeteorSystem::new();
        let mut ctx = HazardContext {
            dt: 0.1,
            grid: &grid,
            traffic: &mut traffic,
            events: &mut events,
            rng: &mut rng,
        };
        shower.update(&mut ctx);
        assert_eq!(shower.count(), 0);
        assert!(ctx.events.is_empty());
    }

    #[test]
    fn test_zero_length_track_aims_at_the_center() {
        let grid = VoxelGrid::new(GridConfig::default());
        let mut rng = SmallRng::seed_from_u64(13);
        let layout = TrafficLayout {
            track_length: 0.0,
            ..test_support::bridge_layout(0)
        };
        let mut traffic = TrafficSimulator::new(layout, 1.0, &grid, &mut rng);
        let mut events = EventQueue::new();
        let mut shower = MeteorSystem::new();
        let mut ctx = HazardContext {
            dt: 0.1,
            grid: &grid,
            traffic: &mut traffic,
            events: &mut events,
            rng: &mut rng,
        };
        shower.trigger(&mut ctx);
        shower.update(&mut ctx);
        assert_eq!(shower.count(), 1);
        let start = shower.iter().next().expect("meteor in flight").body.position;
        assert!(start.x.abs() <= 80.0);
    }
}
