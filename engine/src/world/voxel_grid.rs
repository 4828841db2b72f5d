//! Sparse Voxel Column Grid
//!
//! Owns every destructible bridge voxel. Records live in an arena with a
//! free list; each grid column keeps the arena indices of its vertical
//! stack, so removing a column never searches records by identity.
//!
//! Removing a column hides each of its records in the owning render batch.
//! The hides are queued and drained by the simulation when it emits render
//! output, the same way dirty chunks are drained in a chunked voxel world.

use std::collections::HashMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::grid::{CellKey, GridConfig, spans_touch};
use crate::render::RenderBatchId;

/// Material of a voxel, used to pick render batch and debris look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialClass {
    /// Towers, cables, support beams (orange)
    Structural,
    /// Road surface (grey)
    Deck,
}

impl MaterialClass {
    pub fn color(self) -> [f32; 3] {
        match self {
            MaterialClass::Structural => [0.94, 0.29, 0.0],
            MaterialClass::Deck => [0.2, 0.2, 0.2],
        }
    }
}

/// One box of bridge material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoxelRecord {
    /// World-space center
    pub position: Vec3,
    /// Full box size (sx, sy, sz)
    pub extents: Vec3,
    pub material: MaterialClass,
    /// Render batch holding this voxel's instance
    pub batch: RenderBatchId,
    /// Instance slot inside `batch`
    pub slot: u32,
    pub destructible: bool,
}

/// Arena index of a stored voxel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoxelId(pub u32);

/// A column removed from the grid, with its records in stack order.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedStack {
    pub key: CellKey,
    pub records: Vec<VoxelRecord>,
}

impl RemovedStack {
    /// Y of the first record in the stack, used as the destruction height.
    pub fn reference_y(&self) -> Option<f32> {
        self.records.first().map(|r| r.position.y)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
    #[error("voxel is not destructible and cannot be stored in the grid")]
    NotDestructible,
    #[error("render batch {0:?} is not registered or was retired")]
    UnknownBatch(RenderBatchId),
    #[error("slot {slot} out of range for batch {batch:?} (capacity {capacity})")]
    SlotOutOfRange {
        batch: RenderBatchId,
        slot: u32,
        capacity: u32,
    },
    #[error("{record:?} voxel does not belong in {batch:?}, which draws {expected:?}")]
    MaterialMismatch {
        batch: RenderBatchId,
        expected: MaterialClass,
        record: MaterialClass,
    },
}

#[derive(Debug, Clone)]
struct RenderBatch {
    material: MaterialClass,
    capacity: u32,
    retired: bool,
}

/// Sparse map from grid column to a vertical stack of voxel records.
#[derive(Debug, Clone, Default)]
pub struct VoxelGrid {
    config: GridConfig,
    records: Vec<Option<VoxelRecord>>,
    free: Vec<u32>,
    cells: HashMap<CellKey, Vec<VoxelId>>,
    batches: Vec<RenderBatch>,
    pending_hides: Vec<(RenderBatchId, u32)>,
    live: usize,
}

impl VoxelGrid {
    pub fn new(config: GridConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Quantize a world position to its column. Same rule for insert,
    /// removal and ground checks.
    #[inline]
    pub fn key(&self, x: f32, z: f32) -> CellKey {
        self.config.cell_key(x, z)
    }

    /// Register an instanced mesh with `capacity` slots.
    pub fn register_batch(&mut self, material: MaterialClass, capacity: u32) -> RenderBatchId {
        let id = RenderBatchId(self.batches.len() as u16);
        self.batches.push(RenderBatch {
            material,
            capacity,
            retired: false,
        });
        id
    }

    /// Material a live batch draws with.
    pub fn batch_material(&self, id: RenderBatchId) -> Option<MaterialClass> {
        self.batches
            .get(id.0 as usize)
            .filter(|b| !b.retired)
            .map(|b| b.material)
    }

    /// Tear down a batch. Any record still pointing at it is now dangling;
    /// callers retire batches only after clearing the grid.
    pub fn retire_batch(&mut self, id: RenderBatchId) {
        if let Some(batch) = self.batches.get_mut(id.0 as usize) {
            batch.retired = true;
        }
    }

    /// Append a record to the stack of its column.
    pub fn insert(&mut self, record: VoxelRecord) -> Result<VoxelId, GridError> {
        if !record.destructible {
            return Err(GridError::NotDestructible);
        }
        let batch = self
            .batches
            .get(record.batch.0 as usize)
            .filter(|b| !b.retired)
            .ok_or(GridError::UnknownBatch(record.batch))?;
        if record.slot >= batch.capacity {
            return Err(GridError::SlotOutOfRange {
                batch: record.batch,
                slot: record.slot,
                capacity: batch.capacity,
            });
        }
        if record.material != batch.material {
            return Err(GridError::MaterialMismatch {
                batch: record.batch,
                expected: batch.material,
                record: record.material,
            });
        }

        let id = match self.free.pop() {
            Some(index) => {
                self.records[index as usize] = Some(record);
                VoxelId(index)
            }
            None => {
                self.records.push(Some(record));
                VoxelId(self.records.len() as u32 - 1)
            }
        };

        let key = self.key(record.position.x, record.position.z);
        self.cells.entry(key).or_default().push(id);
        self.live += 1;
        Ok(id)
    }

    /// Remove the whole stack in the column containing `(x, z)`.
    ///
    /// Every record is hidden in its render batch. Returns `None` when the
    /// column is already empty; overlapping blasts hit that case routinely.
    pub fn remove_at(&mut self, x: f32, z: f32) -> Option<RemovedStack> {
        let key = self.key(x, z);
        self.remove_cell(key)
    }

    /// Remove the stack stored under `key`, hiding every record.
    pub fn remove_cell(&mut self, key: CellKey) -> Option<RemovedStack> {
        let ids = self.cells.remove(&key)?;
        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(record) = self.records[id.0 as usize].take() else {
                continue;
            };
            self.free.push(id.0);
            self.live -= 1;
            self.hide(record.batch, record.slot);
            records.push(record);
        }
        Some(RemovedStack { key, records })
    }

    fn hide(&mut self, batch: RenderBatchId, slot: u32) {
        let owner = self.batches.get(batch.0 as usize);
        assert!(
            owner.is_some_and(|b| !b.retired && slot < b.capacity),
            "voxel slot {slot} references torn-down render batch {batch:?}"
        );
        self.pending_hides.push((batch, slot));
    }

    /// Is there any material in the column under `(x, z)`?
    #[inline]
    pub fn has_ground_at(&self, x: f32, z: f32) -> bool {
        self.cells.contains_key(&self.key(x, z))
    }

    /// Highest top surface in the column under `(x, z)`.
    pub fn ground_top_at(&self, x: f32, z: f32) -> Option<f32> {
        self.cell_records(self.key(x, z))
            .map(|r| r.position.y + r.extents.y * 0.5)
            .reduce(f32::max)
    }

    #[inline]
    pub fn contains_cell(&self, key: CellKey) -> bool {
        self.cells.contains_key(&key)
    }

    /// Records stored in one column, in stack order.
    pub fn cell_records(&self, key: CellKey) -> impl Iterator<Item = &VoxelRecord> + '_ {
        self.cells
            .get(&key)
            .into_iter()
            .flatten()
            .filter_map(|id| self.records[id.0 as usize].as_ref())
    }

    pub fn record(&self, id: VoxelId) -> Option<&VoxelRecord> {
        self.records.get(id.0 as usize)?.as_ref()
    }

    /// Do two (neighbouring) columns physically touch?
    ///
    /// True when any record pair has vertical spans within the configured
    /// contact tolerance.
    pub fn columns_touch(&self, a: CellKey, b: CellKey) -> bool {
        let tolerance = self.config.vertical_tolerance;
        self.cell_records(a).any(|ra| {
            self.cell_records(b).any(|rb| {
                spans_touch(
                    ra.position.y,
                    ra.extents.y,
                    rb.position.y,
                    rb.extents.y,
                    tolerance,
                )
            })
        })
    }

    pub fn cell_keys(&self) -> impl Iterator<Item = CellKey> + '_ {
        self.cells.keys().copied()
    }

    /// Number of stored voxels.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Render-slot hides waiting for [`Self::drain_hidden_slots`]. Each
    /// record is hidden once, so this never exceeds the records inserted.
    pub fn pending_hidden_count(&self) -> usize {
        self.pending_hides.len()
    }

    /// Take all render-slot hides queued since the last drain.
    pub fn drain_hidden_slots(&mut self) -> Vec<(RenderBatchId, u32)> {
        std::mem::take(&mut self.pending_hides)
    }

    /// Drop every record and batch; used on scenario reload.
    pub fn clear(&mut self) {
        self.records.clear();
        self.free.clear();
        self.cells.clear();
        self.batches.clear();
        self.pending_hides.clear();
        self.live = 0;
    }
}
