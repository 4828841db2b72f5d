//! Destruction lifecycle system.
//!
//! Owns the structural analyzer and the debris list, encapsulating the full
//! remove → integrity check → detach → debris pipeline with zero render
//! coupling. Everything that destroys bridge material goes through here.

use glam::Vec3;
use rand::Rng;

use super::debris_system::DebrisSystem;
use crate::game::physics::support::{AnchorPredicate, StructuralIntegrityAnalyzer};
use crate::world::{CellKey, VoxelGrid};

/// Sample spacing of the blast disc; matches the grid pitch so each
/// sample hits a distinct column.
const BLAST_SAMPLE_STEP: f32 = 10.0;

/// Result of one removal event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DestroyOutcome {
    /// Voxels removed directly (the hit stacks)
    pub removed: usize,
    /// Voxels detached by the integrity check (each became debris)
    pub detached: usize,
    /// Number of unanchored clusters found
    pub clusters: usize,
}

impl DestroyOutcome {
    fn merge(&mut self, other: DestroyOutcome) {
        self.removed += other.removed;
        self.detached += other.detached;
        self.clusters += other.clusters;
    }

    pub fn is_empty(&self) -> bool {
        self.removed == 0 && self.detached == 0
    }
}

/// Manages the full destruction lifecycle: remove → collapse → fall.
///
/// Call [`destroy_at`](DestructionSystem::destroy_at) for a point hit or
/// [`blast`](DestructionSystem::blast) for an area. Call
/// [`update`](DestructionSystem::update) each frame to tick debris.
#[derive(Debug)]
pub struct DestructionSystem {
    analyzer: StructuralIntegrityAnalyzer,
    debris: DebrisSystem,
    total_removed: u64,
    total_detached: u64,
}

impl DestructionSystem {
    pub fn new(anchors: AnchorPredicate) -> Self {
        Self {
            analyzer: StructuralIntegrityAnalyzer::new(anchors),
            debris: DebrisSystem::new(),
            total_removed: 0,
            total_detached: 0,
        }
    }

    /// Remove the stack under `(x, z)` and detach whatever lost its anchor.
    ///
    /// The removed stack itself is hidden without spawning debris. An empty
    /// column is a no-op.
    pub fn destroy_at<R: Rng>(
        &mut self,
        grid: &mut VoxelGrid,
        x: f32,
        z: f32,
        rng: &mut R,
    ) -> DestroyOutcome {
        let Some(stack) = grid.remove_at(x, z) else {
            return DestroyOutcome::default();
        };
        let mut outcome = DestroyOutcome {
            removed: stack.records.len(),
            ..DestroyOutcome::default()
        };
        outcome.merge(self.collapse_around(grid, stack.key, rng));
        self.total_removed += outcome.removed as u64;
        outcome
    }

    /// Destroy every column whose sample point lies in the disc of
    /// `radius` around `center`.
    pub fn blast<R: Rng>(
        &mut self,
        grid: &mut VoxelGrid,
        center: Vec3,
        radius: f32,
        rng: &mut R,
    ) -> DestroyOutcome {
        let mut outcome = DestroyOutcome::default();
        let steps = (2.0 * radius / BLAST_SAMPLE_STEP).floor() as i32;
        for i in 0..=steps {
            let dx = -radius + i as f32 * BLAST_SAMPLE_STEP;
            for j in 0..=steps {
                let dz = -radius + j as f32 * BLAST_SAMPLE_STEP;
                if dx * dx + dz * dz <= radius * radius {
                    outcome.merge(self.destroy_at(grid, center.x + dx, center.z + dz, rng));
                }
            }
        }
        outcome
    }

    /// Pull a whole stack out as debris (grab). Returns the id of the first
    /// fragment, which becomes the held object.
    pub fn pull_stack<R: Rng>(
        &mut self,
        grid: &mut VoxelGrid,
        x: f32,
        z: f32,
        rng: &mut R,
    ) -> Option<u32> {
        let stack = grid.remove_at(x, z)?;
        let mut first = None;
        for record in &stack.records {
            let id = self.debris.spawn(record, rng);
            first.get_or_insert(id);
        }
        self.total_removed += stack.records.len() as u64;
        self.collapse_around(grid, stack.key, rng);
        first
    }

    fn collapse_around<R: Rng>(
        &mut self,
        grid: &mut VoxelGrid,
        key: CellKey,
        rng: &mut R,
    ) -> DestroyOutcome {
        let mut outcome = DestroyOutcome::default();
        for cluster in self.analyzer.check(grid, key) {
            outcome.clusters += 1;
            outcome.detached += cluster.records.len();
            for record in &cluster.records {
                self.debris.spawn(record, rng);
            }
        }
        self.total_detached += outcome.detached as u64;
        outcome
    }

    /// Tick debris physics.
    pub fn update(&mut self, dt: f32) {
        self.debris.tick(dt);
    }

    pub fn debris(&self) -> &DebrisSystem {
        &self.debris
    }

    pub fn debris_mut(&mut self) -> &mut DebrisSystem {
        &mut self.debris
    }

    pub fn analyzer(&self) -> &StructuralIntegrityAnalyzer {
        &self.analyzer
    }

    /// Total voxels removed directly this session.
    pub fn total_removed(&self) -> u64 {
        self.total_removed
    }

    /// Total voxels detached by collapse this session.
    pub fn total_detached(&self) -> u64 {
        self.total_detached
    }

    /// Drop all debris and install new anchors (scenario reload).
    pub fn reset(&mut self, anchors: AnchorPredicate) {
        self.analyzer = StructuralIntegrityAnalyzer::new(anchors);
        self.debris.clear();
        self.total_removed = 0;
        self.total_detached = 0;
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::game::physics::support::AnchorRegion;
    use crate::game::terrain::{build_into_grid, generate_suspension_bridge, SuspensionBridgeConfig};
    use crate::world::GridConfig;

    fn bridge() -> VoxelGrid {
        let mut grid = VoxelGrid::new(GridConfig::default());
        let bp = generate_suspension_bridge(&SuspensionBridgeConfig::default());
        build_into_grid(&bp, &mut grid).expect("build");
        grid
    }

    #[test]
    fn test_small_hole_in_anchored_deck_makes_no_debris() {
        let mut grid = bridge();
        let before = grid.len();
        let mut rng = SmallRng::seed_from_u64(5);
        let mut system = DestructionSystem::new(AnchorPredicate::golden_bridge());

        let outcome = system.destroy_at(&mut grid, 0.0, 0.0, &mut rng);
        assert_eq!(outcome.removed, 2);
        assert_eq!(outcome.detached, 0);
        assert_eq!(grid.len(), before - 2);
        assert_eq!(system.debris().count(), 0);
    }

    #[test]
    fn test_empty_cell_is_a_no_op() {
        let mut grid = bridge();
        let mut rng = SmallRng::seed_from_u64(5);
        let mut system = DestructionSystem::new(AnchorPredicate::golden_bridge());
        assert!(system.destroy_at(&mut grid, 0.0, 500.0, &mut rng).is_empty());
        system.destroy_at(&mut grid, 0.0, 0.0, &mut rng);
        assert!(system.destroy_at(&mut grid, 1.0, 1.0, &mut rng).is_empty());
    }

    #[test]
    fn test_blast_disc_hits_expected_columns() {
        let mut grid = bridge();
        let mut rng = SmallRng::seed_from_u64(5);
        let mut system = DestructionSystem::new(AnchorPredicate::golden_bridge());
        let outcome = system.blast(&mut grid, Vec3::new(0.0, 67.0, 0.0), 25.0, &mut rng);
        // Offsets {-25,-15,-5,5,15,25}: only |dx|,|dz| in {5,15} fit in r=25,
        // giving 16 distinct road+support columns
        assert_eq!(outcome.removed, 32);
        assert_eq!(outcome.detached, 0);
        assert!(!grid.has_ground_at(0.0, 0.0));
        assert!(grid.has_ground_at(100.0, 0.0));
    }

    #[test]
    fn test_pulling_a_stack_makes_each_voxel_debris() {
        let mut grid = bridge();
        let before = grid.len();
        let mut rng = SmallRng::seed_from_u64(5);
        let mut system = DestructionSystem::new(AnchorPredicate::golden_bridge());
        let first = system.pull_stack(&mut grid, 5.0, 5.0, &mut rng);
        assert!(first.is_some());
        assert_eq!(system.debris().count(), 2);
        assert_eq!(grid.len(), before - 2);
        assert!(system.pull_stack(&mut grid, 5.0, 5.0, &mut rng).is_none());
    }

    #[test]
    fn test_severed_span_collapses_into_debris() {
        // Anchor only the left end; cutting a full-width strip drops the rest
        let mut grid = bridge();
        let before = grid.len();
        let anchors = AnchorPredicate::new(vec![AnchorRegion::Band {
            center_x: -1495.0,
            half_width: 1.0,
        }]);
        let mut system = DestructionSystem::new(anchors);
        let mut rng = SmallRng::seed_from_u64(9);

        let mut outcome = DestroyOutcome::default();
        for z in [-35.0, -25.0, -15.0, -5.0, 5.0, 15.0, 25.0, 35.0] {
            outcome.merge(system.destroy_at(&mut grid, -1485.0, z, &mut rng));
        }
        assert_eq!(outcome.removed, 8 + 6);
        assert!(outcome.detached > 0);
        assert_eq!(grid.len(), before - outcome.removed - outcome.detached);
        assert_eq!(system.debris().count(), outcome.detached);
        // Only the anchored end column survives
        assert!(grid.has_ground_at(-1495.0, 0.0));
        assert!(!grid.has_ground_at(0.0, 0.0));
    }
}
