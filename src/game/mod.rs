//! Game Module
//!
//! Bridge-specific systems that build on top of the engine: scenarios,
//! structural collapse, traffic, hazards and the ambient population, all
//! driven by [`Simulation`].

pub mod config;
pub mod destruction;
pub mod events;
pub mod input;
pub mod physics;
pub mod population;
pub mod scenarios;
pub mod state;
pub mod systems;
pub mod terrain;

pub use config::{ConfigError, LaneSpec, ScenarioKind, SimConfig, TrafficLayout};
pub use destruction::{DebrisEntity, Meteor};
pub use events::{EventQueue, ExplosionRequest, SimEvent};
pub use input::{GrabTarget, HazardKind, HeldObject, InteractionRequest};
pub use physics::{AnchorPredicate, StructuralIntegrityAnalyzer};
pub use population::Population;
pub use scenarios::Scenario;
pub use state::{MAX_TICK_DT, SimError, Simulation};
pub use systems::{
    DebrisSystem, DestructionSystem, ExplosionParticles, Hazard, HazardZone, MeteorSystem,
    TornadoSystem, TrafficSimulator, VolcanoSystem,
};
pub use terrain::{SuspensionBridgeConfig, WATER_LEVEL};
