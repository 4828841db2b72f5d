//! Instance Transform Output for the Render Sink
//!
//! The simulation never draws anything. Each tick it pushes a world
//! transform (and, for cars, a body tint) per live entity into a
//! [`RenderSink`]; the sink turns those into instanced draw calls. Scale is
//! used as the visibility toggle: a zero scale hides the instance.

use std::collections::HashMap;

use glam::{Quat, Vec3};

/// Handle of a render batch (one instanced mesh) that owns voxel slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderBatchId(pub u16);

/// Which instanced mesh an instance slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderChannel {
    /// Bridge voxels, one batch per material
    Voxels(RenderBatchId),
    /// Detached falling fragments (slot = debris id)
    Debris,
    /// Car bodies, one channel per vehicle geometry class
    CarBody(u8),
    Ship,
    Bird,
    Pedestrian,
    ExplosionParticle,
    LavaParticle,
    Meteor,
    /// Volcano cone (single slot)
    Volcano,
    /// Tornado funnel (single slot)
    Tornado,
}

/// GPU-ready instance transform.
///
/// Layout (48 bytes total, 16-byte aligned):
/// - rotation: vec4<f32> (16 bytes) - quaternion (x, y, z, w)
/// - position: vec3<f32> (12 bytes)
/// - _pad0:    u32 (4 bytes)
/// - scale:    vec3<f32> (12 bytes) - non-uniform, zero = hidden
/// - _pad1:    u32 (4 bytes)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceTransform {
    pub rotation: [f32; 4],
    pub position: [f32; 3],
    pub _pad0: u32,
    pub scale: [f32; 3],
    pub _pad1: u32,
}

static_assertions::assert_eq_size!(InstanceTransform, [u8; 48]);

impl Default for InstanceTransform {
    fn default() -> Self {
        Self {
            rotation: [0.0, 0.0, 0.0, 1.0],
            position: [0.0; 3],
            _pad0: 0,
            scale: [1.0; 3],
            _pad1: 0,
        }
    }
}

impl InstanceTransform {
    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            rotation: rotation.to_array(),
            position: position.to_array(),
            _pad0: 0,
            scale: scale.to_array(),
            _pad1: 0,
        }
    }

    /// Position + rotation at unit scale.
    pub fn visible(position: Vec3, rotation: Quat) -> Self {
        Self::new(position, rotation, Vec3::ONE)
    }

    /// A collapsed, invisible instance.
    pub fn hidden() -> Self {
        Self {
            scale: [0.0; 3],
            ..Self::default()
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.scale == [0.0; 3]
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

/// Consumer of per-tick instance updates.
pub trait RenderSink {
    /// Overwrite the transform of one instance slot.
    fn set_transform(&mut self, channel: RenderChannel, slot: u32, transform: InstanceTransform);

    /// Overwrite the tint of one instance slot.
    fn set_tint(&mut self, _channel: RenderChannel, _slot: u32, _tint: [f32; 3]) {}

    /// An instance slot will never be written again (e.g. debris sank).
    fn release(&mut self, _channel: RenderChannel, _slot: u32) {}
}

/// Sink that keeps the latest value per slot. Used by the headless runner
/// and by tests to inspect what the simulation emitted.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub transforms: HashMap<(RenderChannel, u32), InstanceTransform>,
    pub tints: HashMap<(RenderChannel, u32), [f32; 3]>,
    pub released: usize,
    pub writes: usize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transform(&self, channel: RenderChannel, slot: u32) -> Option<&InstanceTransform> {
        self.transforms.get(&(channel, slot))
    }

    pub fn tint(&self, channel: RenderChannel, slot: u32) -> Option<[f32; 3]> {
        self.tints.get(&(channel, slot)).copied()
    }

    /// Number of slots in `channel` whose latest transform is visible.
    pub fn visible_count(&self, channel: RenderChannel) -> usize {
        self.transforms
            .iter()
            .filter(|((c, _), t)| *c == channel && !t.is_hidden())
            .count()
    }
}

impl RenderSink for RecordingSink {
    fn set_transform(&mut self, channel: RenderChannel, slot: u32, transform: InstanceTransform) {
        self.writes += 1;
        self.transforms.insert((channel, slot), transform);
    }

    fn set_tint(&mut self, channel: RenderChannel, slot: u32, tint: [f32; 3]) {
        self.tints.insert((channel, slot), tint);
    }

    fn release(&mut self, channel: RenderChannel, slot: u32) {
        self.released += 1;
        self.transforms.remove(&(channel, slot));
        self.tints.remove(&(channel, slot));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_transform_is_pod() {
        let t = InstanceTransform::visible(Vec3::new(1.0, 2.0, 3.0), Quat::IDENTITY);
        let bytes: &[u8] = bytemuck::bytes_of(&t);
        assert_eq!(bytes.len(), 48);
        let back: &InstanceTransform = bytemuck::from_bytes(bytes);
        assert_eq!(back.position, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_hidden_has_zero_scale() {
        assert!(InstanceTransform::hidden().is_hidden());
        assert!(!InstanceTransform::default().is_hidden());
    }

    #[test]
    fn test_recording_sink_tracks_latest_and_release() {
        let mut sink = RecordingSink::new();
        sink.set_transform(RenderChannel::Debris, 3, InstanceTransform::default());
        sink.set_transform(RenderChannel::Debris, 3, InstanceTransform::hidden());
        assert_eq!(sink.writes, 2);
        assert_eq!(sink.visible_count(RenderChannel::Debris), 0);
        sink.release(RenderChannel::Debris, 3);
        assert!(sink.transform(RenderChannel::Debris, 3).is_none());
        assert_eq!(sink.released, 1);
    }
}
