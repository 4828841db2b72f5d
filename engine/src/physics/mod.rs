//! Physics module
//!
//! Simplified kinematics for the bridge simulation. There is no rigid-body
//! solver: detached bodies fly ballistically and never collide with each
//! other or with the voxel grid.
//!
//! # Unit System
//!
//! **1 unit = 1 meter**, velocities in m/s, accelerations in m/s².
//!
//! # Submodules
//!
//! - [`ballistics`] - Gravity integration and fixed-rate spin
//! - [`collision`] - Squared-distance proximity tests and blast falloff

pub mod ballistics;
pub mod collision;

pub use ballistics::{
    BallisticBody, DEBRIS_GRAVITY, EXPLODE_GRAVITY, FALL_GRAVITY, GRAVITY, Spin,
};
pub use collision::{
    horizontal_direction, horizontal_distance_squared, radial_falloff, within_radius,
    within_radius_xz,
};
