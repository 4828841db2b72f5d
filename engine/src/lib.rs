//! Bridge Simulation Engine Library
//!
//! A frame-stepped simulation of a voxelised suspension bridge under
//! attack: a sparse voxel grid with connectivity-based collapse, ballistic
//! debris, lane-based traffic and environmental hazards. The library never
//! draws anything; it pushes instance transforms into a render sink.
//!
//! # Modules
//!
//! - [`world`] - Column grid quantization and the sparse voxel store
//! - [`physics`] - Ballistic integration and proximity tests
//! - [`render`] - The render-sink contract (instance transforms, tints)
//! - [`game`] - Scenarios, structural integrity, traffic, hazards and the
//!   [`Simulation`](game::Simulation) context
//!
//! # Example
//!
//! ```ignore
//! use bridge_sim_engine::game::{InteractionRequest, SimConfig, Simulation};
//! use bridge_sim_engine::render::RecordingSink;
//! use glam::Vec3;
//!
//! let mut sim = Simulation::new(SimConfig::default())?;
//! sim.request(InteractionRequest::Explode { point: Vec3::new(0.0, 67.0, 0.0) });
//!
//! let mut sink = RecordingSink::new();
//! for _ in 0..60 {
//!     sim.tick(1.0 / 60.0);
//!     sim.emit_render(&mut sink);
//! }
//! ```

pub mod physics;
pub mod render;
pub mod world;

// Game-specific modules (located in src/game/ directory)
#[path = "../../src/game/mod.rs"]
pub mod game;

// Re-export the render contract at crate level for convenience
pub use render::*;
// Re-export world types for convenience
pub use world::{CellKey, GridConfig, VoxelGrid, VoxelRecord};
// Re-export the simulation entry points
pub use game::{SimConfig, Simulation};
