//! Physics Module
//!
//! Structural support analysis for the bridge deck.

pub mod support;

pub use support::{
    AnchorPredicate, AnchorRegion, DetachedCluster, EARLY_EXIT_CLUSTER_CELLS,
    StructuralIntegrityAnalyzer,
};
