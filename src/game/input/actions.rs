//! Interaction Requests
//!
//! What an external picking collaborator can ask of the simulation. The
//! caller has already turned screen input into world points and object
//! ids; nothing here does any projection.

use glam::Vec3;

/// An object the user picked for grabbing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GrabTarget {
    /// Pool index of a car
    Car(usize),
    /// Id of a falling fragment
    Debris(u32),
    /// World point on the deck; the whole stack under it is pulled out
    Voxel(Vec3),
    Ship(usize),
}

/// The object currently held, after a grab resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeldObject {
    Car(usize),
    Debris(u32),
    Ship(usize),
}

/// Hazards that can be started on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HazardKind {
    Volcano,
    MeteorShower,
    Tornado,
}

impl HazardKind {
    pub const ALL: [HazardKind; 3] = [
        HazardKind::Volcano,
        HazardKind::MeteorShower,
        HazardKind::Tornado,
    ];
}

/// High-level request from the input side
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionRequest {
    /// Blow up the picked point
    Explode { point: Vec3 },
    Grab { target: GrabTarget },
    /// Pull the held object toward a point
    Drag { point: Vec3 },
    /// Let go of the held object
    Release,
    /// Start a hazard; ignored while it is already running
    Trigger(HazardKind),
}
