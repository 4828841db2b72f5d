//! Debris lifecycle system.
//!
//! Owns every detached bridge fragment from the moment it leaves the grid
//! until it drops below the water line. Fragment ids double as render
//! slots on the debris channel and are recycled after release.

use std::collections::BTreeSet;

use glam::Vec3;
use rand::Rng;

use crate::game::destruction::DebrisEntity;
use crate::game::terrain::WATER_LEVEL;
use crate::world::VoxelRecord;

/// Manages free-falling fragments: spawn, ballistic tick, removal at the
/// water level.
#[derive(Debug, Default)]
pub struct DebrisSystem {
    debris: Vec<DebrisEntity>,
    free_ids: Vec<u32>,
    next_id: u32,
    /// Ids removed since the last drain, for render-slot release. A set, so
    /// it never outgrows the id space when nobody drains it.
    released: BTreeSet<u32>,
    water_level: f32,
    total_spawned: u64,
}

impl DebrisSystem {
    pub fn new() -> Self {
        Self {
            water_level: WATER_LEVEL,
            ..Self::default()
        }
    }

    pub fn with_water_level(mut self, water_level: f32) -> Self {
        self.water_level = water_level;
        self
    }

    fn allocate_id(&mut self) -> u32 {
        self.free_ids.pop().unwrap_or_else(|| {
            let id = self.next_id;
            self.next_id += 1;
            id
        })
    }

    /// Turn a voxel record into a falling fragment. Returns its id.
    pub fn spawn<R: Rng>(&mut self, record: &VoxelRecord, rng: &mut R) -> u32 {
        let id = self.allocate_id();
        self.debris.push(DebrisEntity::from_record(id, record, rng));
        self.total_spawned += 1;
        id
    }

    /// Integrate every fragment and remove the ones below the water level.
    /// Returns how many were removed this tick.
    pub fn tick(&mut self, dt: f32) -> usize {
        for d in &mut self.debris {
            d.update(dt);
        }

        let water = self.water_level;
        let before = self.debris.len();
        let mut sunk = Vec::new();
        self.debris.retain(|d| {
            let keep = d.grabbed || d.body.position.y >= water;
            if !keep {
                sunk.push(d.id);
            }
            keep
        });
        self.free_ids.extend(sunk.iter().copied());
        self.released.extend(sunk);
        before - self.debris.len()
    }

    /// Upward kick for fragments near a blast.
    pub fn apply_blast(&mut self, center: Vec3, radius: f32, strength: f32) {
        for d in &mut self.debris {
            if let Some(falloff) = crate::physics::radial_falloff(center, d.position(), radius) {
                d.body.apply_impulse(Vec3::Y * falloff * strength * 0.1);
            }
        }
    }

    pub fn get(&self, id: u32) -> Option<&DebrisEntity> {
        self.debris.iter().find(|d| d.id == id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut DebrisEntity> {
        self.debris.iter_mut().find(|d| d.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DebrisEntity> {
        self.debris.iter()
    }

    /// Take the ids released since the last call, in ascending order.
    pub fn drain_released(&mut self) -> Vec<u32> {
        std::mem::take(&mut self.released).into_iter().collect()
    }

    /// Released ids waiting for [`Self::drain_released`].
    pub fn pending_released(&self) -> usize {
        self.released.len()
    }

    pub fn count(&self) -> usize {
        self.debris.len()
    }

    pub fn total_spawned(&self) -> u64 {
        self.total_spawned
    }

    pub fn clear(&mut self) {
        let ids: Vec<u32> = self.debris.iter().map(|d| d.id).collect();
        self.released.extend(ids);
        self.debris.clear();
        self.free_ids.clear();
        self.next_id = 0;
    }
}
