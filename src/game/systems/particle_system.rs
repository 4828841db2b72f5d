//! Explosion particles.
//!
//! Fixed pool of fire and smoke puffs. A burst claims slots from a ring
//! cursor, so a full pool recycles its oldest particles instead of
//! allocating.

use glam::{Quat, Vec3};
use rand::Rng;

use crate::physics::{BallisticBody, GRAVITY};
use crate::render::{InstanceTransform, RenderChannel, RenderSink};

/// Maximum number of particles alive at once.
pub const MAX_PARTICLES: usize = 2000;
/// Particles per burst at scale 1.
pub const PARTICLES_PER_BURST: f32 = 50.0;

/// CPU-side particle with physics state.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Particle {
    pub body: BallisticBody,
    /// Remaining lifetime (seconds)
    pub life: f32,
    pub max_life: f32,
    pub color: [f32; 3],
    pub active: bool,
}

impl Particle {
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.active && self.life > 0.0
    }

    /// Remaining life fraction; doubles as the render scale.
    pub fn fade(&self) -> f32 {
        if self.max_life > 0.0 { (self.life / self.max_life).clamp(0.0, 1.0) } else { 0.0 }
    }
}

/// Particle pool for explosion bursts.
#[derive(Debug)]
pub struct ExplosionParticles {
    particles: Vec<Particle>,
    cursor: usize,
    total_bursts: u64,
}

impl Default for ExplosionParticles {
    fn default() -> Self {
        Self::new()
    }
}

impl ExplosionParticles {
    pub fn new() -> Self {
        Self {
            particles: vec![Particle::default(); MAX_PARTICLES],
            cursor: 0,
            total_bursts: 0,
        }
    }

    /// Spawn `50 * scale` particles around `position`; half fire, half
    /// smoke. Larger bursts spread further and live longer.
    pub fn burst<R: Rng>(&mut self, position: Vec3, scale: f32, rng: &mut R) {
        let scale = scale.max(0.0);
        let count = ((PARTICLES_PER_BURST * scale) as usize).min(MAX_PARTICLES);
        let jitter = 2.5 * scale;
        let speed = 15.0 * scale;

        for i in 0..count {
            let offset = Vec3::new(
                rng.random_range(-1.0..=1.0),
                rng.random_range(-1.0..=1.0),
                rng.random_range(-1.0..=1.0),
            ) * jitter;
            let mut velocity = Vec3::new(
                rng.random_range(-1.0..=1.0) * speed,
                rng.random_range(-1.0..=1.0) * speed + 10.0 * scale,
                rng.random_range(-1.0..=1.0) * speed,
            );
            let mut life = (1.0 + rng.random::<f32>()) * scale.sqrt();

            let color = if i % 2 == 0 {
                fire_color(rng.random_range(0.05..0.15))
            } else {
                // Smoke rises and lingers
                velocity.y += 10.0 * scale;
                life += 1.0;
                let grey = rng.random_range(0.25..0.45);
                [grey; 3]
            };

            self.particles[self.cursor] = Particle {
                body: BallisticBody::new(position + offset, velocity),
                life,
                max_life: life,
                color,
                active: true,
            };
            self.cursor = (self.cursor + 1) % MAX_PARTICLES;
        }
        self.total_bursts += 1;
    }

    pub fn update(&mut self, dt: f32) {
        for p in self.particles.iter_mut().filter(|p| p.active) {
            p.body.integrate(GRAVITY, dt);
            p.life -= dt;
            if p.life <= 0.0 {
                p.active = false;
            }
        }
    }

    pub fn active_count(&self) -> usize {
        self.particles.iter().filter(|p| p.active).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(|p| p.active)
    }

    pub fn total_bursts(&self) -> u64 {
        self.total_bursts
    }

    pub fn clear(&mut self) {
        for p in &mut self.particles {
            p.active = false;
        }
    }

    /// One transform per pool slot; dead slots are hidden.
    pub fn emit(&self, sink: &mut impl RenderSink) {
        for (i, p) in self.particles.iter().enumerate() {
            if p.active {
                let transform =
                    InstanceTransform::new(p.body.position, Quat::IDENTITY, Vec3::splat(p.fade()));
                sink.set_transform(RenderChannel::ExplosionParticle, i as u32, transform);
                sink.set_tint(RenderChannel::ExplosionParticle, i as u32, p.color);
            } else {
                sink.set_transform(
                    RenderChannel::ExplosionParticle,
                    i as u32,
                    InstanceTransform::hidden(),
                );
            }
        }
    }
}

/// Saturated orange-yellow from a hue in [0, 1] (HSL, s=1, l=0.5).
fn fire_color(hue: f32) -> [f32; 3] {
    let channel = |offset: f32| {
        let k = (offset + hue * 12.0) % 12.0;
        0.5 - 0.5 * (k - 3.0).min(9.0 - k).clamp(-1.0, 1.0)
    };
    [channel(0.0), channel(8.0), channel(4.0)]
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn test_burst_size_scales() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut pool = ExplosionParticles::new();
        pool.burst(Vec3::ZERO, 2.0, &mut rng);
        assert_eq!(pool.active_count(), 100);
    }

    #[test]
    fn test_full_pool_recycles_oldest() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut pool = ExplosionParticles::new();
        for _ in 0..50 {
            pool.burst(Vec3::ZERO, 1.0, &mut rng);
        }
        assert_eq!(pool.active_count(), MAX_PARTICLES);
        assert_eq!(pool.total_bursts(), 50);
    }

    #[test]
    fn test_particles_fade_out() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut pool = ExplosionParticles::new();
        pool.burst(Vec3::new(0.0, 50.0, 0.0), 1.0, &mut rng);
        pool.update(0.5);
        assert!(pool.iter().all(|p| p.fade() < 1.0));
        for _ in 0..10 {
            pool.update(0.5);
        }
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn test_fire_is_warm() {
        let [r, g, b] = fire_color(0.1);
        assert!(r > g && g > b);
        assert!((r - 1.0).abs() < 1e-5);
    }
}
