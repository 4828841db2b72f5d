//! Game systems
//!
//! Each system owns its state and advances it in `update`; the simulation
//! context wires them together.

pub mod debris_system;
pub mod destruction_system;
pub mod hazard;
pub mod meteor_system;
pub mod particle_system;
pub mod tornado_system;
pub mod traffic;
pub mod volcano_system;

pub use debris_system::DebrisSystem;
pub use destruction_system::{DestroyOutcome, DestructionSystem};
pub use hazard::{Hazard, HazardContext, HazardZone};
pub use meteor_system::MeteorSystem;
pub use particle_system::{ExplosionParticles, Particle};
pub use tornado_system::TornadoSystem;
pub use traffic::{Car, CarMode, TrafficContext, TrafficSimulator, TrafficStats, VehicleClass};
pub use volcano_system::{LavaParticle, VolcanoSystem};
