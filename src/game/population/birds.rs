//! Birds
//!
//! A loose flock wandering at constant speed. Each tick the heading gets a
//! small random nudge; the speed is then renormalised.

use glam::{Quat, Vec3};
use rand::Rng;

use crate::render::{InstanceTransform, RenderChannel, RenderSink};

pub const BIRD_COUNT: usize = 100;
pub const BIRD_SPEED: f32 = 20.0;
/// Birds wrap around at this |x| or |z|.
pub const FLOCK_HALF_EXTENT: f32 = 1000.0;
const MIN_ALTITUDE: f32 = 80.0;
const MAX_ALTITUDE: f32 = 260.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bird {
    pub position: Vec3,
    pub velocity: Vec3,
}

#[derive(Debug, Default)]
pub struct Flock {
    birds: Vec<Bird>,
}

impl Flock {
    pub fn new<R: Rng>(count: usize, rng: &mut R) -> Self {
        let birds = (0..count)
            .map(|_| {
                let heading = rng.random_range(0.0..std::f32::consts::TAU);
                Bird {
                    position: Vec3::new(
                        rng.random_range(-500.0..500.0),
                        rng.random_range(100.0..200.0),
                        rng.random_range(-500.0..500.0),
                    ),
                    velocity: Vec3::new(heading.cos(), 0.0, heading.sin()) * BIRD_SPEED,
                }
            })
            .collect();
        Self { birds }
    }

    pub fn update<R: Rng>(&mut self, dt: f32, rng: &mut R) {
        for bird in &mut self.birds {
            bird.velocity += Vec3::new(
                rng.random_range(-5.0..=5.0) * dt,
                rng.random_range(-1.0..=1.0) * dt,
                rng.random_range(-5.0..=5.0) * dt,
            );
            if (bird.position.y < MIN_ALTITUDE && bird.velocity.y < 0.0)
                || (bird.position.y > MAX_ALTITUDE && bird.velocity.y > 0.0)
            {
                bird.velocity.y = -bird.velocity.y;
            }
            bird.velocity = bird.velocity.normalize_or(Vec3::X) * BIRD_SPEED;
            bird.position += bird.velocity * dt;

            for axis in [0, 2] {
                if bird.position[axis] > FLOCK_HALF_EXTENT {
                    bird.position[axis] = -FLOCK_HALF_EXTENT;
                } else if bird.position[axis] < -FLOCK_HALF_EXTENT {
                    bird.position[axis] = FLOCK_HALF_EXTENT;
                }
            }
        }
    }

    pub fn birds(&self) -> &[Bird] {
        &self.birds
    }

    pub fn emit(&self, sink: &mut impl RenderSink) {
        for (i, bird) in self.birds.iter().enumerate() {
            let facing = Quat::from_rotation_arc(Vec3::Z, bird.velocity.normalize_or(Vec3::Z));
            sink.set_transform(
                RenderChannel::Bird,
                i as u32,
                InstanceTransform::visible(bird.position, facing),
            );
        }
    }
}
