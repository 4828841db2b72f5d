//! World Module
//!
//! Column-grid quantization and the sparse voxel store for bridge material.

pub mod grid;
pub mod voxel_grid;

pub use grid::{CellKey, GridConfig, VERTICAL_CONTACT_TOLERANCE, cell_key, spans_touch};
pub use voxel_grid::{
    GridError, MaterialClass, RemovedStack, VoxelGrid, VoxelId, VoxelRecord,
};
