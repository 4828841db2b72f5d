//! Suspension Bridge Generation
//!
//! Lays out the voxelised deck of the suspension bridge plus the static
//! towers and cables. Only deck voxels (road surface and the support layer
//! under it) are destructible and go into the [`VoxelGrid`]; towers and
//! cables are emitted once as static geometry.

use glam::Vec3;

use crate::render::RenderBatchId;
use crate::world::{GridError, MaterialClass, VoxelGrid, VoxelRecord};

// ============================================================================
// BRIDGE CONFIGURATION
// ============================================================================

/// Suspension bridge dimensions (world units)
#[derive(Clone, Debug, PartialEq)]
pub struct SuspensionBridgeConfig {
    /// Deck length along x; the deck runs from -length/2 to +length/2
    pub deck_length: f32,
    /// Road surface width along z
    pub deck_width: f32,
    /// Width of the support layer under the road (strictly narrower)
    pub support_width: f32,
    /// Center height of the road layer
    pub deck_height: f32,
    /// Road layer thickness
    pub road_thickness: f32,
    /// Support layer thickness
    pub support_thickness: f32,
    /// Vertical offset of the support layer below the road center
    pub support_drop: f32,
    /// Distance between the two towers
    pub tower_spacing: f32,
    pub tower_height: f32,
    /// Cable sag at mid-span
    pub cable_sag: f32,
    /// Lateral offset of the two main cables
    pub cable_offset: f32,
    /// Voxel pitch; must match the grid pitch
    pub pitch: f32,
}

impl Default for SuspensionBridgeConfig {
    fn default() -> Self {
        Self {
            deck_length: 3000.0,
            deck_width: 80.0,
            support_width: 70.0,
            deck_height: 67.0,
            road_thickness: 2.0,
            support_thickness: 8.0,
            support_drop: 5.0,
            tower_spacing: 1280.0,
            tower_height: 220.0,
            cable_sag: 150.0,
            cable_offset: 42.0,
            pitch: 10.0,
        }
    }
}

/// One axis-aligned box of bridge geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoxelSpec {
    pub position: Vec3,
    pub extents: Vec3,
    pub material: MaterialClass,
}

impl VoxelSpec {
    fn new(position: Vec3, extents: Vec3, material: MaterialClass) -> Self {
        Self {
            position,
            extents,
            material,
        }
    }
}

/// Full bridge layout before it is committed to a grid.
#[derive(Clone, Debug, Default)]
pub struct BridgeBlueprint {
    /// Destructible road-surface voxels
    pub road: Vec<VoxelSpec>,
    /// Destructible support voxels under the road
    pub supports: Vec<VoxelSpec>,
    /// Towers, cables and hangers; never destroyed
    pub static_pieces: Vec<VoxelSpec>,
}

/// What was committed to the grid.
#[derive(Clone, Debug, Default)]
pub struct BuildReport {
    /// Number of destructible voxels inserted into the grid
    pub destructible: usize,
    /// Render batch holding the static pieces
    pub static_batch: Option<RenderBatchId>,
    pub static_pieces: Vec<VoxelSpec>,
}

// ============================================================================
// BRIDGE GENERATION
// ============================================================================

/// Generate the bridge layout.
pub fn generate_suspension_bridge(config: &SuspensionBridgeConfig) -> BridgeBlueprint {
    let mut blueprint = BridgeBlueprint::default();
    let g = config.pitch;
    let half_len = config.deck_length * 0.5;
    let half_width = config.deck_width * 0.5;
    let half_support = config.support_width * 0.5;

    let mut x = -half_len + g * 0.5;
    while x < half_len {
        let mut z = -half_width + g * 0.5;
        while z < half_width {
            blueprint.road.push(VoxelSpec::new(
                Vec3::new(x, config.deck_height, z),
                Vec3::new(g, config.road_thickness, g),
                MaterialClass::Deck,
            ));
            if z > -half_support && z < half_support {
                blueprint.supports.push(VoxelSpec::new(
                    Vec3::new(x, config.deck_height - config.support_drop, z),
                    Vec3::new(g, config.support_thickness, g),
                    MaterialClass::Structural,
                ));
            }
            z += g;
        }
        x += g;
    }

    for tower_x in [-config.tower_spacing * 0.5, config.tower_spacing * 0.5] {
        push_tower(&mut blueprint.static_pieces, config, tower_x);
    }
    for z in [config.cable_offset, -config.cable_offset] {
        push_cable(&mut blueprint.static_pieces, config, z);
    }

    blueprint
}

fn push_tower(out: &mut Vec<VoxelSpec>, config: &SuspensionBridgeConfig, x: f32) {
    let leg_dist = 40.0;
    let width = 30.0;
    let depth = 20.0;
    let h = config.tower_height;
    let s = MaterialClass::Structural;

    for z in [leg_dist, -leg_dist] {
        out.push(VoxelSpec::new(
            Vec3::new(x, h * 0.5 - 20.0, z),
            Vec3::new(width, h, depth),
            s,
        ));
    }

    let mut y = config.deck_height + 20.0;
    while y < h - 20.0 {
        out.push(VoxelSpec::new(
            Vec3::new(x, y, 0.0),
            Vec3::new(width - 5.0, 10.0, leg_dist * 2.0),
            s,
        ));
        y += 40.0;
    }

    out.push(VoxelSpec::new(
        Vec3::new(x, h - 10.0, 0.0),
        Vec3::new(width + 5.0, 20.0, leg_dist * 2.0 + depth),
        s,
    ));
    // Beacon
    out.push(VoxelSpec::new(Vec3::new(x, h + 5.0, 0.0), Vec3::new(4.0, 10.0, 4.0), s));
}

fn push_cable(out: &mut Vec<VoxelSpec>, config: &SuspensionBridgeConfig, z: f32) {
    let span = config.tower_spacing;
    let h = config.tower_height;
    let deck = config.deck_height;
    let s = MaterialClass::Structural;
    let node = Vec3::splat(2.0);

    let hanger = |out: &mut Vec<VoxelSpec>, x: f32, y: f32| {
        out.push(VoxelSpec::new(
            Vec3::new(x, (y + deck) * 0.5, z),
            Vec3::new(1.0, y - deck, 1.0),
            s,
        ));
    };

    // Main span: parabola between the towers
    let segments = 200;
    for i in 0..=segments {
        let t = i as f32 / segments as f32;
        let x = -span * 0.5 + t * span;
        let y = h - 4.0 * config.cable_sag * (x / span).powi(2);
        out.push(VoxelSpec::new(Vec3::new(x, y, z), node, s));
        if x.abs() % 40.0 < 2.0 {
            hanger(out, x, y);
        }
    }

    // Side spans: straight run from tower top down to the deck ends
    let side_len = (config.deck_length - 200.0 - span) * 0.5;
    let side_segments = 50;
    for i in 0..=side_segments {
        let t = i as f32 / side_segments as f32;
        let y = h - t * (h - deck);
        for x in [-span * 0.5 - t * side_len, span * 0.5 + t * side_len] {
            out.push(VoxelSpec::new(Vec3::new(x, y, z), node, s));
            if i % 5 == 0 {
                hanger(out, x, y);
            }
        }
    }
}

/// Commit a blueprint to the grid, one render batch per material.
pub fn build_into_grid(
    blueprint: &BridgeBlueprint,
    grid: &mut VoxelGrid,
) -> Result<BuildReport, GridError> {
    let road_batch = grid.register_batch(MaterialClass::Deck, blueprint.road.len() as u32);
    let support_batch =
        grid.register_batch(MaterialClass::Structural, blueprint.supports.len() as u32);

    let mut destructible = 0;
    for (specs, batch) in [(&blueprint.road, road_batch), (&blueprint.supports, support_batch)] {
        for (slot, spec) in specs.iter().enumerate() {
            grid.insert(VoxelRecord {
                position: spec.position,
                extents: spec.extents,
                material: spec.material,
                batch,
                slot: slot as u32,
                destructible: true,
            })?;
            destructible += 1;
        }
    }

    let static_batch = (!blueprint.static_pieces.is_empty()).then(|| {
        grid.register_batch(
            MaterialClass::Structural,
            blueprint.static_pieces.len() as u32,
        )
    });

    Ok(BuildReport {
        destructible,
        static_batch,
        static_pieces: blueprint.static_pieces.clone(),
    })
}
