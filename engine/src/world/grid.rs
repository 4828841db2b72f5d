//! Grid Configuration Module
//!
//! Quantization of world-space (x, z) positions onto the voxel column grid.
//!
//! The bridge grid is a 2D map of vertical columns. Every lookup that needs
//! to agree on cell identity (insertion, removal, ground checks, the
//! structural analyzer) goes through [`GridConfig::cell_key`], so there is
//! exactly one quantization rule in the crate.
//!
//! ## Cell layout
//! With pitch `G`, cell `(ix, iz)` covers `[ix*G, (ix+1)*G) x [iz*G, (iz+1)*G)`
//! and its center sits at `(ix*G + G/2, iz*G + G/2)`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Default grid pitch for bridge voxels (world units)
pub const DEFAULT_GRID_PITCH: f32 = 10.0;

/// Maximum vertical gap between two records in neighbouring columns for them
/// to count as touching.
///
/// The grid collapses Y, so 3D adjacency is approximated: neighbouring
/// columns connect when any pair of their records has vertical spans that
/// overlap after being widened by this tolerance. Tunable; 2.0 joins the
/// road layer (sy=2) with the support layer (sy=8) underneath it.
pub const VERTICAL_CONTACT_TOLERANCE: f32 = 2.0;

/// Integer column index on the voxel grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellKey {
    pub ix: i32,
    pub iz: i32,
}

impl CellKey {
    pub const fn new(ix: i32, iz: i32) -> Self {
        Self { ix, iz }
    }

    /// The four horizontal neighbours (+x, -x, +z, -z).
    #[inline]
    pub fn neighbors4(self) -> [CellKey; 4] {
        [
            CellKey::new(self.ix + 1, self.iz),
            CellKey::new(self.ix - 1, self.iz),
            CellKey::new(self.ix, self.iz + 1),
            CellKey::new(self.ix, self.iz - 1),
        ]
    }
}

/// Grid configuration for world-space column lookups.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Column pitch along X and Z
    pub pitch: f32,
    /// Vertical contact tolerance used for neighbour connectivity
    pub vertical_tolerance: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            pitch: DEFAULT_GRID_PITCH,
            vertical_tolerance: VERTICAL_CONTACT_TOLERANCE,
        }
    }
}

impl GridConfig {
    pub fn new(pitch: f32) -> Self {
        Self {
            pitch,
            ..Self::default()
        }
    }

    /// Quantize a world position to the column containing it.
    ///
    /// Pure and deterministic: the same `(x, z)` always yields the same key.
    #[inline]
    pub fn cell_key(&self, x: f32, z: f32) -> CellKey {
        cell_key(x, z, self.pitch)
    }

    /// World-space center of a column.
    #[inline]
    pub fn cell_center(&self, key: CellKey) -> Vec2 {
        Vec2::new(
            key.ix as f32 * self.pitch + self.pitch * 0.5,
            key.iz as f32 * self.pitch + self.pitch * 0.5,
        )
    }

    /// Snap a world position to the center of its column.
    pub fn snap_to_cell_center(&self, x: f32, z: f32) -> Vec2 {
        self.cell_center(self.cell_key(x, z))
    }
}

/// Free-function form of [`GridConfig::cell_key`].
#[inline]
pub fn cell_key(x: f32, z: f32, pitch: f32) -> CellKey {
    CellKey::new((x / pitch).floor() as i32, (z / pitch).floor() as i32)
}

/// True when two vertical spans `[y - h/2, y + h/2]` touch within `tolerance`.
#[inline]
pub fn spans_touch(y_a: f32, height_a: f32, y_b: f32, height_b: f32, tolerance: f32) -> bool {
    let gap = (y_a - y_b).abs() - (height_a + height_b) * 0.5;
    gap <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_stable_across_calls() {
        let grid = GridConfig::default();
        for &(x, z) in &[(0.0, 0.0), (-1395.0, 35.0), (4.999, -0.001), (1234.5, -25.0)] {
            assert_eq!(grid.cell_key(x, z), grid.cell_key(x, z));
        }
    }

    #[test]
    fn test_key_floors_negative_coordinates() {
        let grid = GridConfig::default();
        assert_eq!(grid.cell_key(-0.1, -0.1), CellKey::new(-1, -1));
        assert_eq!(grid.cell_key(9.99, 0.0), CellKey::new(0, 0));
        assert_eq!(grid.cell_key(10.0, 0.0), CellKey::new(1, 0));
    }

    #[test]
    fn test_center_maps_back_to_same_key() {
        let grid = GridConfig::default();
        let key = grid.cell_key(-25.0, 17.0);
        let c = grid.cell_center(key);
        assert_eq!(grid.cell_key(c.x, c.y), key);
        assert_eq!(c, Vec2::new(-25.0, 15.0));
    }

    #[test]
    fn test_road_and_support_layers_touch() {
        // Road y=67 sy=2, support y=62 sy=8
        assert!(spans_touch(67.0, 2.0, 62.0, 8.0, VERTICAL_CONTACT_TOLERANCE));
        // A cable 100 units higher does not
        assert!(!spans_touch(167.0, 2.0, 62.0, 8.0, VERTICAL_CONTACT_TOLERANCE));
    }
}
