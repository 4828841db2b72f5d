//! Render Output Module
//!
//! The render-sink contract: transforms and tints pushed out of the
//! simulation each tick. No GPU code lives here.

pub mod instancing;

pub use instancing::{
    InstanceTransform, RecordingSink, RenderBatchId, RenderChannel, RenderSink,
};
