//! Grid Tests - Column Keys, Stacks and Structural Collapse
//!
//! Tests for the sparse voxel grid and the integrity analyzer: key
//! quantization, stack removal, and which material falls after a column
//! disappears.

use bridge_sim_engine::game::physics::{AnchorPredicate, AnchorRegion, StructuralIntegrityAnalyzer};
use bridge_sim_engine::render::RenderBatchId;
use bridge_sim_engine::world::{CellKey, GridConfig, MaterialClass, VoxelGrid, VoxelRecord};
use glam::Vec3;

const PITCH: f32 = 10.0;

fn deck_record(batch: RenderBatchId, slot: u32, x: f32, z: f32) -> VoxelRecord {
    VoxelRecord {
        position: Vec3::new(x, 67.0, z),
        extents: Vec3::new(PITCH, 2.0, PITCH),
        material: MaterialClass::Deck,
        batch,
        slot,
        destructible: true,
    }
}

/// A single-row spine of `len` cells starting at x = 5, plus one floating
/// island cell far away at x = 505.
fn spine_with_island(len: u32) -> VoxelGrid {
    let mut grid = VoxelGrid::new(GridConfig::default());
    let batch = grid.register_batch(MaterialClass::Deck, len + 1);
    for i in 0..len {
        grid.insert(deck_record(batch, i, 5.0 + i as f32 * PITCH, 5.0))
            .expect("spine voxel");
    }
    grid.insert(deck_record(batch, len, 505.0, 5.0)).expect("island voxel");
    grid
}

/// Only the first spine cell (x in [0, 10)) is anchored.
fn left_end_anchor() -> AnchorPredicate {
    AnchorPredicate::new(vec![AnchorRegion::Band {
        center_x: 5.0,
        half_width: 5.0,
    }])
}

// ============================================================================
// Key Tests
// ============================================================================

#[test]
fn test_key_is_deterministic_inside_a_cell() {
    let config = GridConfig::default();
    let key = config.cell_key(3.0, 7.0);
    for (x, z) in [(0.0, 0.0), (9.99, 9.99), (3.0, 7.0), (0.001, 5.5)] {
        assert_eq!(config.cell_key(x, z), key);
    }
    assert_eq!(config.cell_key(10.0, 0.0), CellKey::new(1, 0));
}

#[test]
fn test_key_floors_negative_coordinates() {
    let config = GridConfig::default();
    assert_eq!(config.cell_key(-0.1, -0.1), CellKey::new(-1, -1));
    assert_eq!(config.cell_key(-10.0, 0.0), CellKey::new(-1, 0));
    assert_eq!(config.cell_key(-10.1, 0.0), CellKey::new(-2, 0));
}

#[test]
fn test_cell_center_round_trips_through_key() {
    let config = GridConfig::default();
    for key in [CellKey::new(0, 0), CellKey::new(-150, 3), CellKey::new(149, -4)] {
        let center = config.cell_center(key);
        assert_eq!(config.cell_key(center.x, center.y), key);
    }
}

// ============================================================================
// Stack Tests
// ============================================================================

#[test]
fn test_stack_removal_hides_every_record() {
    let mut grid = VoxelGrid::new(GridConfig::default());
    let batch = grid.register_batch(MaterialClass::Deck, 3);
    for slot in 0..3 {
        let mut record = deck_record(batch, slot, 15.0, 15.0);
        record.position.y = 60.0 + slot as f32 * 2.0;
        grid.insert(record).expect("stacked voxel");
    }
    assert_eq!(grid.cell_count(), 1);

    let stack = grid.remove_at(12.0, 18.0).expect("column present");
    assert_eq!(stack.records.len(), 3);
    assert_eq!(stack.reference_y(), Some(60.0));
    assert!(grid.is_empty());

    let mut hidden: Vec<u32> = grid.drain_hidden_slots().into_iter().map(|(_, s)| s).collect();
    hidden.sort_unstable();
    assert_eq!(hidden, vec![0, 1, 2]);
    assert!(grid.remove_at(15.0, 15.0).is_none());
}

#[test]
fn test_non_destructible_records_are_rejected() {
    let mut grid = VoxelGrid::new(GridConfig::default());
    let batch = grid.register_batch(MaterialClass::Deck, 1);
    let mut record = deck_record(batch, 0, 5.0, 5.0);
    record.destructible = false;
    assert!(grid.insert(record).is_err());
    assert!(grid.is_empty());
}

// ============================================================================
// Connectivity Tests
// ============================================================================

#[test]
fn test_cut_spine_drops_the_unanchored_half_only() {
    let mut grid = spine_with_island(20);
    let analyzer = StructuralIntegrityAnalyzer::new(left_end_anchor());

    let removed = grid.remove_at(105.0, 5.0).expect("spine cell");
    let clusters = analyzer.check(&mut grid, removed.key);

    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].cells.len(), 9);
    assert!(clusters[0].records.iter().all(|r| r.position.x > 105.0));

    // Anchored half and the untouched island stay
    assert_eq!(grid.len(), 10 + 1);
    assert!(grid.has_ground_at(5.0, 5.0));
    assert!(grid.has_ground_at(95.0, 5.0));
    assert!(!grid.has_ground_at(115.0, 5.0));
    assert!(grid.has_ground_at(505.0, 5.0));
}

#[test]
fn test_island_hanging_off_a_removed_branch_falls() {
    let mut grid = VoxelGrid::new(GridConfig::default());
    let batch = grid.register_batch(MaterialClass::Deck, 23);
    for i in 0..20 {
        grid.insert(deck_record(batch, i, 5.0 + i as f32 * PITCH, 5.0))
            .expect("spine voxel");
    }
    // Branch off the middle of the spine, feeding a two-cell island
    grid.insert(deck_record(batch, 20, 105.0, 15.0)).expect("branch voxel");
    grid.insert(deck_record(batch, 21, 105.0, 25.0)).expect("island voxel");
    grid.insert(deck_record(batch, 22, 115.0, 25.0)).expect("island voxel");
    let analyzer = StructuralIntegrityAnalyzer::new(left_end_anchor());

    let removed = grid.remove_at(105.0, 15.0).expect("branch cell");
    let clusters = analyzer.check(&mut grid, removed.key);

    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].cells.len(), 2);
    assert!(clusters[0].records.iter().all(|r| r.position.z == 25.0));

    // The spine is untouched
    assert_eq!(grid.len(), 20);
    for i in 0..20 {
        assert!(grid.has_ground_at(5.0 + i as f32 * PITCH, 5.0));
    }
    assert!(!grid.has_ground_at(105.0, 25.0));
    assert!(!grid.has_ground_at(115.0, 25.0));
}

#[test]
fn test_every_remaining_neighbour_reaches_an_anchor() {
    let mut grid = spine_with_island(20);
    let anchors = left_end_anchor();
    let analyzer = StructuralIntegrityAnalyzer::new(anchors.clone());

    for x in [155.0, 65.0, 25.0] {
        let removed = grid.remove_at(x, 5.0).expect("spine cell");
        analyzer.check(&mut grid, removed.key);

        // Walk left from every surviving spine cell; it must hit the anchor
        // without crossing a gap.
        for key in grid.cell_keys().filter(|k| k.ix < 50) {
            let mut ix = key.ix;
            while ix > 0 {
                assert!(grid.contains_cell(CellKey::new(ix - 1, key.iz)));
                ix -= 1;
            }
            let center = grid.config().cell_center(CellKey::new(ix, key.iz));
            assert!(anchors.is_anchor(center.x, 67.0, center.y));
        }
    }
    assert_eq!(grid.len(), 2 + 1);
}

#[test]
fn test_early_exit_never_saves_unanchored_material() {
    let mut grid = spine_with_island(40);
    let analyzer = StructuralIntegrityAnalyzer::new(AnchorPredicate::none()).with_early_exit(8);

    let removed = grid.remove_at(105.0, 5.0).expect("spine cell");
    let clusters = analyzer.check(&mut grid, removed.key);

    // Both halves outgrow the early-exit bound but never reach an anchor
    assert_eq!(clusters.len(), 2);
    let cells: usize = clusters.iter().map(|c| c.cells.len()).sum();
    assert_eq!(cells, 39);
    assert_eq!(grid.len(), 1);
}

#[test]
fn test_small_early_exit_still_finds_a_distant_anchor() {
    let mut grid = spine_with_island(40);
    let analyzer = StructuralIntegrityAnalyzer::new(left_end_anchor()).with_early_exit(4);

    let removed = grid.remove_at(305.0, 5.0).expect("spine cell");
    let clusters = analyzer.check(&mut grid, removed.key);

    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].cells.len(), 9);
    assert_eq!(grid.len(), 30 + 1);
}

#[test]
fn test_analysis_without_neighbours_is_a_no_op() {
    let mut grid = spine_with_island(3);
    let analyzer = StructuralIntegrityAnalyzer::new(AnchorPredicate::none());
    let removed = grid.remove_at(505.0, 5.0).expect("island");
    assert!(analyzer.check(&mut grid, removed.key).is_empty());
    assert_eq!(grid.len(), 3);
}
