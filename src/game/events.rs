//! Simulation Events
//!
//! Hazards, traffic collisions and interaction requests never touch the
//! grid, the debris list or the particle pool directly. They push typed
//! events here and the simulation drains the queue in a single dispatch
//! step.

use glam::Vec3;

/// A blast: destroys grid columns in a disc and pushes dynamic bodies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplosionRequest {
    pub center: Vec3,
    /// Columns within this horizontal radius are removed
    pub destroy_radius: f32,
    /// Bodies within this distance are pushed with `1 - d/R` falloff
    pub force_radius: f32,
    /// Impulse at the blast center
    pub strength: f32,
    /// Visual burst size
    pub burst_scale: f32,
}

impl ExplosionRequest {
    /// Explosion triggered by the user at a picked point.
    pub fn user(center: Vec3) -> Self {
        Self {
            center,
            destroy_radius: 25.0,
            force_radius: 100.0,
            strength: 200.0,
            burst_scale: 2.0,
        }
    }

    /// Explosion from a meteor impact.
    pub fn meteor(center: Vec3) -> Self {
        Self {
            center,
            destroy_radius: 25.0,
            force_radius: 80.0,
            strength: 150.0,
            burst_scale: 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimEvent {
    Explosion(ExplosionRequest),
    /// Remove the column under (x, z) and run the integrity check
    Destroy { x: f32, z: f32 },
    /// Cosmetic fire/smoke burst
    Burst { position: Vec3, scale: f32 },
}

/// FIFO of events produced during one tick.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<SimEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    pub fn explode(&mut self, request: ExplosionRequest) {
        self.push(SimEvent::Explosion(request));
    }

    pub fn burst(&mut self, position: Vec3, scale: f32) {
        self.push(SimEvent::Burst { position, scale });
    }

    /// Take every queued event in push order.
    pub fn drain(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SimEvent> {
        self.events.iter()
    }
}
