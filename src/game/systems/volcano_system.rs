//! Volcano hazard.
//!
//! A cone rises out of the sea beside the bridge and, once it breaks the
//! surface, throws lava from its crater. Lava that lands on the deck burns
//! through the column it hits. The cone and the lava are both
//! [`HazardZone`]s for cars and ships.

use glam::{Quat, Vec3};
use rand::Rng;

use super::hazard::{Hazard, HazardContext, HazardZone};
use crate::game::events::SimEvent;
use crate::physics::{BallisticBody, horizontal_distance_squared, within_radius};
use crate::render::{InstanceTransform, RenderChannel, RenderSink};

pub const CONE_BASE_RADIUS: f32 = 200.0;
pub const CONE_HEIGHT: f32 = 300.0;
/// Depth the cone center starts at when triggered.
pub const START_DEPTH: f32 = -350.0;
pub const RISE_SPEED: f32 = 20.0;
/// Center height at which the cone stops rising and erupts.
pub const ERUPT_HEIGHT: f32 = -50.0;
/// Center height above which lava already spills out while rising.
pub const EARLY_LAVA_HEIGHT: f32 = -200.0;
/// Crater height above the cone center.
pub const CRATER_OFFSET: f32 = 140.0;

pub const LAVA_POOL_SIZE: usize = 1000;
pub const LAVA_GRAVITY: f32 = 90.8;
/// Lava below this height has hit the sea.
pub const LAVA_FLOOR: f32 = -10.0;
const LAVA_SPREAD: f32 = 20.0;

/// One pooled lava blob.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LavaParticle {
    pub body: BallisticBody,
    pub life: f32,
    pub max_life: f32,
    pub active: bool,
}

impl LavaParticle {
    fn remaining(&self) -> f32 {
        if self.max_life > 0.0 { (self.life / self.max_life).clamp(0.0, 1.0) } else { 0.0 }
    }
}

#[derive(Debug)]
pub struct VolcanoSystem {
    /// Cone center; the summit is half the cone height above it
    position: Vec3,
    active: bool,
    erupting: bool,
    lava: Vec<LavaParticle>,
    cursor: usize,
    /// Destroy events raised by landing lava
    burns: u64,
}

impl Default for VolcanoSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl VolcanoSystem {
    pub fn new() -> Self {
        Self {
            position: Vec3::new(0.0, START_DEPTH, 0.0),
            active: false,
            erupting: false,
            lava: vec![LavaParticle::default(); LAVA_POOL_SIZE],
            cursor: 0,
            burns: 0,
        }
    }

    /// Start the volcano with its cone center at `position`.
    pub fn trigger_at(&mut self, position: Vec3) {
        if self.active {
            return;
        }
        self.position = position;
        self.active = true;
        self.erupting = position.y >= ERUPT_HEIGHT;
        tracing::info!(x = position.x, z = position.z, "volcano rising");
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn summit_y(&self) -> f32 {
        self.position.y + CONE_HEIGHT * 0.5
    }

    pub fn crater(&self) -> Vec3 {
        self.position + Vec3::Y * CRATER_OFFSET
    }

    pub fn is_erupting(&self) -> bool {
        self.erupting
    }

    pub fn lava(&self) -> impl Iterator<Item = &LavaParticle> {
        self.lava.iter().filter(|p| p.active)
    }

    pub fn lava_count(&self) -> usize {
        self.lava().count()
    }

    pub fn burns(&self) -> u64 {
        self.burns
    }

    fn spawn_lava<R: Rng>(&mut self, rng: &mut R) {
        let crater = self.crater();
        let count = rng.random_range(5..=9);
        for _ in 0..count {
            let velocity = Vec3::new(
                rng.random_range(-LAVA_SPREAD..LAVA_SPREAD),
                rng.random_range(50.0..150.0),
                rng.random_range(-LAVA_SPREAD..LAVA_SPREAD),
            );
            let life = rng.random_range(2.0..4.0);
            // Ring buffer: the oldest blob is recycled when the pool is full
            self.lava[self.cursor] = LavaParticle {
                body: BallisticBody::new(crater, velocity),
                life,
                max_life: life,
                active: true,
            };
            self.cursor = (self.cursor + 1) % LAVA_POOL_SIZE;
        }
    }

    /// Cone and lava transforms.
    pub fn emit(&self, sink: &mut impl RenderSink) {
        let cone = if self.active {
            InstanceTransform::new(
                self.position,
                Quat::IDENTITY,
                Vec3::new(CONE_BASE_RADIUS, CONE_HEIGHT, CONE_BASE_RADIUS),
            )
        } else {
            InstanceTransform::hidden()
        };
        sink.set_transform(RenderChannel::Volcano, 0, cone);
        for (i, p) in self.lava.iter().enumerate() {
            let transform = if p.active {
                InstanceTransform::new(p.body.position, Quat::IDENTITY, Vec3::splat(p.remaining()))
            } else {
                InstanceTransform::hidden()
            };
            sink.set_transform(RenderChannel::LavaParticle, i as u32, transform);
        }
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl Hazard for VolcanoSystem {
    fn name(&self) -> &'static str {
        "volcano"
    }

    fn trigger(&mut self, ctx: &mut HazardContext<'_>) {
        if self.active {
            return;
        }
        let side = if ctx.rng.random_bool(0.5) { 1.0 } else { -1.0 };
        let position = Vec3::new(
            ctx.rng.random_range(-500.0..500.0),
            START_DEPTH,
            side * ctx.rng.random_range(400.0..800.0),
        );
        self.trigger_at(position);
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn update(&mut self, ctx: &mut HazardContext<'_>) {
        if !self.active {
            return;
        }
        let dt = ctx.dt;

        if self.position.y < ERUPT_HEIGHT {
            self.position.y = (self.position.y + RISE_SPEED * dt).min(ERUPT_HEIGHT);
        } else if !self.erupting {
            self.erupting = true;
            tracing::info!("volcano erupting");
        }
        if self.erupting || self.position.y > EARLY_LAVA_HEIGHT {
            self.spawn_lava(ctx.rng);
        }

        for p in self.lava.iter_mut().filter(|p| p.active) {
            p.body.integrate(LAVA_GRAVITY, dt);
            p.life -= dt;
            let pos = p.body.position;
            if p.body.velocity.y < 0.0 {
                if let Some(top) = ctx.grid.ground_top_at(pos.x, pos.z) {
                    if pos.y <= top {
                        ctx.events.push(SimEvent::Destroy { x: pos.x, z: pos.z });
                        self.burns += 1;
                        p.active = false;
                        continue;
                    }
                }
            }
            if pos.y < LAVA_FLOOR || p.life <= 0.0 {
                p.active = false;
            }
        }
    }
}

impl HazardZone for VolcanoSystem {
    /// Inside the cone: below the summit and within the cone radius at that
    /// height, never wider than the base.
    fn collides(&self, point: Vec3) -> bool {
        if !self.active {
            return false;
        }
        let summit = self.summit_y();
        if point.y >= summit {
            return false;
        }
        let radius = (CONE_BASE_RADIUS * (summit - point.y) / CONE_HEIGHT).min(CONE_BASE_RADIUS);
        horizontal_distance_squared(point, self.position) <= radius * radius
    }

    fn lava_hits(&self, point: Vec3, radius: f32) -> bool {
        self.lava().any(|p| within_radius(p.body.position, point, radius))
    }
}
