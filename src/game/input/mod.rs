//! Input Module
//!
//! Requests the outside world can make of a running simulation.

pub mod actions;

pub use actions::{GrabTarget, HazardKind, HeldObject, InteractionRequest};
