//! Structural Support
//!
//! Connectivity-based collapse detection for the bridge deck.
//!
//! After a column is removed, every surviving neighbour column seeds a
//! breadth-first search over touching columns. A cluster that reaches an
//! anchor (tower footprint or landing) stays; a cluster that does not is
//! removed from the grid and handed back for conversion to debris.

use std::collections::{HashSet, VecDeque};

use crate::world::{CellKey, VoxelGrid, VoxelRecord};

/// Once a cluster is known to be anchored and has grown past this many
/// cells, the search stops early. Unexplored cells of that cluster may be
/// re-scanned by a later event.
pub const EARLY_EXIT_CLUSTER_CELLS: usize = 256;

/// Fixed region of world space that holds material up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AnchorRegion {
    /// `|x - center_x| < half_width` (tower footprint band)
    Band { center_x: f32, half_width: f32 },
    /// `|x| > abs_x` (both landing ends)
    Beyond { abs_x: f32 },
}

impl AnchorRegion {
    #[inline]
    fn contains(&self, x: f32) -> bool {
        match *self {
            AnchorRegion::Band {
                center_x,
                half_width,
            } => (x - center_x).abs() < half_width,
            AnchorRegion::Beyond { abs_x } => x.abs() > abs_x,
        }
    }
}

/// Pure predicate over world position; regions never move.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnchorPredicate {
    regions: Vec<AnchorRegion>,
}

impl AnchorPredicate {
    pub fn new(regions: Vec<AnchorRegion>) -> Self {
        Self { regions }
    }

    /// Tower bands at x = +/-640 and landings beyond |x| = 1350.
    pub fn golden_bridge() -> Self {
        Self::new(vec![
            AnchorRegion::Band {
                center_x: -640.0,
                half_width: 40.0,
            },
            AnchorRegion::Band {
                center_x: 640.0,
                half_width: 40.0,
            },
            AnchorRegion::Beyond { abs_x: 1350.0 },
        ])
    }

    /// Nothing is anchored.
    pub fn none() -> Self {
        Self::default()
    }

    /// Anchoring only depends on x for bridge geometry; y and z are kept in
    /// the signature so other layouts can add height or depth regions.
    #[inline]
    pub fn is_anchor(&self, x: f32, _y: f32, _z: f32) -> bool {
        self.regions.iter().any(|r| r.contains(x))
    }
}

/// A cluster that lost every path to an anchor and was pulled out of the
/// grid.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DetachedCluster {
    pub cells: Vec<CellKey>,
    pub records: Vec<VoxelRecord>,
}

/// Decides which material falls after a removal.
#[derive(Clone, Debug)]
pub struct StructuralIntegrityAnalyzer {
    anchors: AnchorPredicate,
    early_exit_cells: usize,
}

impl StructuralIntegrityAnalyzer {
    pub fn new(anchors: AnchorPredicate) -> Self {
        Self {
            anchors,
            early_exit_cells: EARLY_EXIT_CLUSTER_CELLS,
        }
    }

    pub fn with_early_exit(mut self, cells: usize) -> Self {
        self.early_exit_cells = cells;
        self
    }

    pub fn anchors(&self) -> &AnchorPredicate {
        &self.anchors
    }

    fn cell_is_anchored(&self, grid: &VoxelGrid, key: CellKey) -> bool {
        let center = grid.config().cell_center(key);
        let y = grid.cell_records(key).next().map_or(0.0, |r| r.position.y);
        self.anchors.is_anchor(center.x, y, center.y)
    }

    /// Check the neighbourhood of a removed column and detach every
    /// unanchored cluster.
    ///
    /// Detached clusters are already removed from the grid (and hidden in
    /// their render batches) when this returns.
    pub fn check(&self, grid: &mut VoxelGrid, removed: CellKey) -> Vec<DetachedCluster> {
        // Cells proven connected to an anchor during this event
        let mut safe: HashSet<CellKey> = HashSet::new();
        let mut detached = Vec::new();

        for seed in removed.neighbors4() {
            if !grid.contains_cell(seed) || safe.contains(&seed) {
                continue;
            }
            let (cells, anchored) = self.explore(grid, seed, &safe);
            if anchored {
                safe.extend(cells);
                continue;
            }

            let mut cluster = DetachedCluster::default();
            for key in cells {
                if let Some(stack) = grid.remove_cell(key) {
                    cluster.records.extend(stack.records);
                    cluster.cells.push(key);
                }
            }
            tracing::debug!(
                cells = cluster.cells.len(),
                voxels = cluster.records.len(),
                "detached unanchored cluster"
            );
            detached.push(cluster);
        }

        detached
    }

    /// BFS from `seed` over touching columns. Returns the visited cells and
    /// whether the cluster reaches an anchor (directly, or through a cell
    /// already known to be safe).
    fn explore(
        &self,
        grid: &VoxelGrid,
        seed: CellKey,
        safe: &HashSet<CellKey>,
    ) -> (Vec<CellKey>, bool) {
        let mut visited: HashSet<CellKey> = HashSet::from([seed]);
        let mut queue = VecDeque::from([seed]);
        let mut cells = Vec::new();
        let mut anchored = false;

        while let Some(key) = queue.pop_front() {
            cells.push(key);
            if !anchored && self.cell_is_anchored(grid, key) {
                anchored = true;
            }
            if anchored && visited.len() > self.early_exit_cells {
                break;
            }

            for n in key.neighbors4() {
                if visited.contains(&n) || !grid.contains_cell(n) || !grid.columns_touch(key, n) {
                    continue;
                }
                if safe.contains(&n) {
                    anchored = true;
                }
                visited.insert(n);
                queue.push_back(n);
            }
        }

        (cells, anchored)
    }
}
