//! Proximity tests
//!
//! Everything in the sim collides by distance: explosion force radii,
//! volcano cones, lava blobs against cars, tornado capture zones. All
//! checks compare squared distances so no square root is taken on the
//! miss path.

use glam::{Vec2, Vec3};

/// True when `a` and `b` are within `radius` of each other (3D).
#[inline]
pub fn within_radius(a: Vec3, b: Vec3, radius: f32) -> bool {
    a.distance_squared(b) <= radius * radius
}

/// True when `a` and `b` are within `radius` on the ground plane (XZ).
#[inline]
pub fn within_radius_xz(a: Vec3, b: Vec3, radius: f32) -> bool {
    horizontal_distance_squared(a, b) <= radius * radius
}

#[inline]
pub fn horizontal_distance_squared(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x - b.x, a.z - b.z).length_squared()
}

/// Linear falloff `1 - d/R` for a point at distance `d` from a blast
/// center, or `None` outside the radius.
///
/// The edge (`d == R`) yields `Some(0.0)`.
#[inline]
pub fn radial_falloff(center: Vec3, point: Vec3, radius: f32) -> Option<f32> {
    if radius <= 0.0 {
        return None;
    }
    let dist_sq = center.distance_squared(point);
    if dist_sq > radius * radius {
        return None;
    }
    Some(1.0 - dist_sq.sqrt() / radius)
}

/// Unit direction on the XZ plane pointing from `from` to `to`.
///
/// Falls back to +X when the two points share a column, so a body sitting
/// exactly on a blast center is still pushed somewhere.
#[inline]
pub fn horizontal_direction(from: Vec3, to: Vec3) -> Vec3 {
    let d = Vec3::new(to.x - from.x, 0.0, to.z - from.z);
    let len_sq = d.length_squared();
    if len_sq < 1e-8 {
        Vec3::X
    } else {
        d / len_sq.sqrt()
    }
}
