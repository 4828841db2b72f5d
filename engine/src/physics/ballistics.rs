//! Ballistic motion for free-flying bodies
//!
//! Gravity-only integration shared by debris fragments, falling and
//! exploding cars, lava blobs, meteors and explosion particles. No drag,
//! no contact resolution: once a body is ballistic it only ever falls.
//!
//! # Example
//!
//! ```ignore
//! use bridge_sim_engine::physics::ballistics::{BallisticBody, DEBRIS_GRAVITY};
//! use glam::Vec3;
//!
//! let mut body = BallisticBody::new(Vec3::new(0.0, 67.0, 0.0), Vec3::ZERO);
//! body.integrate(DEBRIS_GRAVITY, 1.0 / 60.0);
//! assert!(body.position.y < 67.0);
//! ```

use glam::Vec3;

/// Real-world gravity (m/s²), used by particles and the ambient world.
pub const GRAVITY: f32 = 9.8;

/// Exaggerated gravity for collapsing bridge fragments (4g).
pub const DEBRIS_GRAVITY: f32 = GRAVITY * 4.0;

/// Gravity for cars that lost the road under them.
pub const FALL_GRAVITY: f32 = 30.0;

/// Gravity for cars launched by an explosion.
pub const EXPLODE_GRAVITY: f32 = 50.0;

/// A point body under constant downward acceleration.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BallisticBody {
    /// Current position in world space
    pub position: Vec3,
    /// Current velocity (units/second)
    pub velocity: Vec3,
}

impl BallisticBody {
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Self { position, velocity }
    }

    /// Semi-implicit Euler step: velocity first, then position.
    ///
    /// With a non-positive starting vertical velocity this makes `y` strictly
    /// decrease on every step with `dt > 0`.
    #[inline]
    pub fn integrate(&mut self, gravity: f32, dt: f32) {
        self.velocity.y -= gravity * dt;
        self.position += self.velocity * dt;
    }

    /// Add an instantaneous velocity change.
    #[inline]
    pub fn apply_impulse(&mut self, delta_v: Vec3) {
        self.velocity += delta_v;
    }

    #[inline]
    pub fn is_below(&self, y: f32) -> bool {
        self.position.y < y
    }
}

/// Euler-angle spin integrated at a fixed angular velocity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Spin {
    /// Accumulated rotation (radians, XYZ)
    pub angles: Vec3,
    /// Angular velocity (radians/second)
    pub rate: Vec3,
}

impl Spin {
    pub fn new(rate: Vec3) -> Self {
        Self {
            angles: Vec3::ZERO,
            rate,
        }
    }

    #[inline]
    pub fn integrate(&mut self, dt: f32) {
        self.angles += self.rate * dt;
    }

    pub fn quat(&self) -> glam::Quat {
        glam::Quat::from_euler(glam::EulerRot::XYZ, self.angles.x, self.angles.y, self.angles.z)
    }
}
