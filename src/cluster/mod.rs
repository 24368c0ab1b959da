//! Viewport-adaptive clustering of geographic points in tile pixel space
pub mod anchor;
pub mod distance;
pub mod engine;
pub mod error;
pub mod grid;
pub mod item_set;
pub mod pass;
pub mod point;
pub mod projection;
pub mod signal;

#[cfg(test)]
mod anchor_test;
#[cfg(test)]
mod item_set_test;
#[cfg(test)]
mod point_test;

pub use distance::{
    DEGREE_RAD, EARTH_R, Unit, convert, destination_point, haversine_distance, initial_heading,
    midpoint, to_degrees, to_radians,
};
pub use engine::{
    ClusterEngine, ClusterFrame, EngineConfig, PassOutcome, PassTicket, RenderDispatch, Trigger,
};
pub use error::{ClusterError, Result};
pub use item_set::{ItemSet, ItemStore, ItemsChanged};
pub use pass::{Algorithm, recluster};
pub use point::{Cluster, ClusterKind, Coordinate, Item, PixelBox, PixelPoint};
pub use projection::{MAX_ZOOM, TILE_SIZE, Viewport, from_pixel, map_width_px, to_pixel};
pub use signal::{Signal, SubscriptionId};
