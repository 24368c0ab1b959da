//! Point-of-interest clustering for map and camera overlays
//!
//! Projects geographic items into tile pixel space at the current zoom,
//! culls those outside the (radius-expanded) viewport and groups the rest
//! into clusters with either a fixed grid or first-match point boxes.
//! [`ClusterEngine`] keeps the result current as items and viewport change.
pub mod cluster;

pub use cluster::{
    Algorithm, Cluster, ClusterEngine, ClusterError, ClusterFrame, ClusterKind, Coordinate,
    EngineConfig, Item, ItemSet, ItemStore, PassOutcome, PassTicket, RenderDispatch, Unit,
    Viewport, recluster,
};
