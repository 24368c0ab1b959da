//! One clustering pass: projection, wraparound, culling, then grouping

use tracing::debug;

use super::anchor::anchor_clusters;
use super::error::{Result, check_radius};
use super::grid::grid_clusters;
use super::item_set::ItemSet;
use super::point::{Cluster, Coordinate, PixelPoint};
use super::projection::{Viewport, map_width_px, to_pixel, wrap_x};

/// How often, in items, a long pass checks whether it was superseded
const STALE_CHECK_INTERVAL: usize = 1024;

/// Clustering strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    /// Fixed grid of `2·radius` cells anchored at the map origin
    #[default]
    GridBased,
    /// Boxes opened around the first point reaching them, first match wins
    PointBased,
}

/// An item that survived culling, in world pixel space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub index: usize,
    pub location: Coordinate,
    /// World pixel, shifted by one map width when wrapped
    pub world: PixelPoint,
}

/// What a pass produced
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PassResult {
    Clusters(Vec<Cluster>),
    /// Zoom beyond the deepest clusterable level
    Skipped,
    /// Abandoned because a newer pass was requested
    Cancelled,
}

/// Runs a full, from-scratch pass over `items`
///
/// Returns `Ok(None)` when `viewport.zoom` exceeds the deepest clusterable
/// level; the caller keeps whatever it last rendered.
pub fn recluster<T>(
    items: &ItemSet<T>,
    viewport: &Viewport,
    radius: f64,
    algorithm: Algorithm,
) -> Result<Option<Vec<Cluster>>> {
    check_radius(radius)?;
    match run_pass(items, viewport, radius, algorithm, &|| false) {
        PassResult::Clusters(clusters) => Ok(Some(clusters)),
        PassResult::Skipped | PassResult::Cancelled => Ok(None),
    }
}

pub(crate) fn run_pass<T>(
    items: &ItemSet<T>,
    viewport: &Viewport,
    radius: f64,
    algorithm: Algorithm,
    is_stale: &dyn Fn() -> bool,
) -> PassResult {
    if !viewport.is_clusterable() {
        debug!(zoom = viewport.zoom, "zoom beyond clusterable range, pass skipped");
        return PassResult::Skipped;
    }

    let Some(points) = project_visible(items, viewport, radius, is_stale) else {
        return PassResult::Cancelled;
    };

    let clusters = match algorithm {
        Algorithm::GridBased => Some(grid_clusters(&points, viewport, radius)),
        Algorithm::PointBased => anchor_clusters(&points, viewport.zoom, radius, is_stale),
    };

    match clusters {
        Some(clusters) => {
            debug!(
                items = items.len(),
                visible = points.len(),
                clusters = clusters.len(),
                ?algorithm,
                zoom = viewport.zoom,
                "pass complete"
            );
            PassResult::Clusters(clusters)
        }
        None => PassResult::Cancelled,
    }
}

/// Projects every finite item and keeps those within `radius` of the view
///
/// Returns `None` if `is_stale` reports the pass was superseded.
pub fn project_visible<T>(
    items: &ItemSet<T>,
    viewport: &Viewport,
    radius: f64,
    is_stale: &dyn Fn() -> bool,
) -> Option<Vec<Projected>> {
    let top_left = viewport.top_left();
    let map_width = map_width_px(viewport.zoom);
    let mut visible = Vec::new();

    for (index, item) in items.iter().enumerate() {
        if index % STALE_CHECK_INTERVAL == 0 && is_stale() {
            return None;
        }

        // NaN/Inf would poison cell keys and box tests
        if !item.location.is_finite() {
            continue;
        }

        let world = to_pixel(&item.location, viewport.zoom);
        let screen = PixelPoint::new(
            wrap_x(world.x - top_left.x, viewport.width(), radius, map_width),
            world.y - top_left.y,
        );
        if !screen.is_finite() || !viewport.contains_expanded(screen, radius) {
            continue;
        }

        visible.push(Projected {
            index,
            location: item.location,
            world: PixelPoint::new(top_left.x + screen.x, top_left.y + screen.y),
        });
    }

    Some(visible)
}
