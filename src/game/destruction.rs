//! Destruction Entities
//!
//! Free-falling bridge fragments and meteors. Both are plain ballistic
//! bodies; the systems in [`crate::game::systems`] own their lifecycles.

use glam::{Quat, Vec3};
use rand::Rng;

use crate::physics::{BallisticBody, DEBRIS_GRAVITY, GRAVITY, Spin};
use crate::world::{MaterialClass, VoxelRecord};

/// Max random horizontal kick given to a freshly detached fragment.
pub const DEBRIS_KICK: f32 = 1.5;

/// Max spin rate per axis for a detached fragment (rad/s).
pub const DEBRIS_SPIN: f32 = 1.0;

/// A detached voxel falling toward the water.
#[derive(Clone, Debug, PartialEq)]
pub struct DebrisEntity {
    /// Stable id, also the render slot on the debris channel
    pub id: u32,
    pub body: BallisticBody,
    pub spin: Spin,
    /// Box size copied from the voxel
    pub extents: Vec3,
    pub material: MaterialClass,
    /// Held by the user; gravity is suspended
    pub grabbed: bool,
}

impl DebrisEntity {
    /// Capture a voxel record as a falling fragment.
    ///
    /// Vertical velocity starts at zero; the horizontal kick and spin are
    /// small and random.
    pub fn from_record<R: Rng>(id: u32, record: &VoxelRecord, rng: &mut R) -> Self {
        let kick = Vec3::new(
            rng.random_range(-DEBRIS_KICK..=DEBRIS_KICK),
            0.0,
            rng.random_range(-DEBRIS_KICK..=DEBRIS_KICK),
        );
        let spin = Vec3::new(
            rng.random_range(-DEBRIS_SPIN..=DEBRIS_SPIN),
            rng.random_range(-DEBRIS_SPIN..=DEBRIS_SPIN),
            rng.random_range(-DEBRIS_SPIN..=DEBRIS_SPIN),
        );
        Self {
            id,
            body: BallisticBody::new(record.position, kick),
            spin: Spin::new(spin),
            extents: record.extents,
            material: record.material,
            grabbed: false,
        }
    }

    pub fn update(&mut self, dt: f32) {
        if self.grabbed {
            return;
        }
        self.body.integrate(DEBRIS_GRAVITY, dt);
        self.spin.integrate(dt);
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.body.position
    }

    pub fn rotation(&self) -> Quat {
        self.spin.quat()
    }
}

// ============================================================================
// METEOR
// ============================================================================

/// A falling meteor aimed at a point on the deck.
#[derive(Clone, Debug, PartialEq)]
pub struct Meteor {
    pub body: BallisticBody,
    pub spin: Spin,
    pub size: f32,
    /// Safety timeout (seconds)
    pub lifetime: f32,
    pub active: bool,
}

impl Meteor {
    /// Launch from high above `target`, slightly offset, flying at it.
    pub fn new<R: Rng>(target: Vec3, rng: &mut R) -> Self {
        let start = target
            + Vec3::new(
                rng.random_range(-80.0..80.0),
                rng.random_range(300.0..400.0),
                rng.random_range(-80.0..80.0),
            );
        let speed = rng.random_range(120.0..160.0);
        let velocity = (target - start).normalize_or_zero() * speed;
        let spin = Vec3::new(
            rng.random_range(-2.0..2.0),
            rng.random_range(-1.5..1.5),
            rng.random_range(-2.5..2.5),
        );
        Self {
            body: BallisticBody::new(start, velocity),
            spin: Spin::new(spin),
            size: rng.random_range(3.0..6.0),
            lifetime: 10.0,
            active: true,
        }
    }

    /// Step physics. Returns the impact point once the meteor reaches
    /// `surface_y(x, z)`.
    pub fn update(&mut self, dt: f32, surface_y: impl Fn(f32, f32) -> f32) -> Option<Vec3> {
        if !self.active {
            return None;
        }
        self.lifetime -= dt;
        // Light gravity; meteors mostly keep their entry velocity
        self.body.integrate(GRAVITY * 0.3, dt);
        self.spin.integrate(dt);

        let p = self.body.position;
        if p.y <= surface_y(p.x, p.z) + self.size * 0.5 {
            self.active = false;
            return Some(p);
        }
        if self.lifetime <= 0.0 {
            self.active = false;
        }
        None
    }

    pub fn is_alive(&self) -> bool {
        self.active && self.lifetime > 0.0
    }
}
