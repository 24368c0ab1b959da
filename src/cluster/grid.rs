use std::collections::HashMap;

use super::pass::Projected;
use super::point::{Cluster, PixelBox, PixelPoint};
use super::projection::{Viewport, map_width_px};

/// Groups points by the `2·radius` grid cell they fall into
///
/// The grid is anchored at the projected `(0°, 0°)` pixel, so panning never
/// moves a point to another cell; only zooming does. Points closer than
/// `radius` to each other can still land in different cells when they
/// straddle a cell edge.
///
/// Each cell becomes one cluster located at its first point, with the cell
/// rectangle (world pixels) as its box. Runs in O(n).
pub fn grid_clusters(points: &[Projected], viewport: &Viewport, radius: f64) -> Vec<Cluster> {
    let cell = 2.0 * radius;
    let half_map = map_width_px(viewport.zoom) / 2.0;
    let origin = PixelPoint::new(half_map, half_map);
    let top_left = viewport.top_left();

    // Cell indices are taken relative to the first cell touching the
    // expanded view, which keeps the linear key unique per cell
    let first_col = ((top_left.x - radius - origin.x) / cell).floor() as i64;
    let first_row = ((top_left.y - radius - origin.y) / cell).floor() as i64;
    let num_cells_x = ((viewport.width() + cell) / cell).ceil() as i64 + 2;

    let mut by_key: HashMap<i64, usize> = HashMap::new();
    let mut clusters: Vec<Cluster> = Vec::new();

    for p in points {
        let col = ((p.world.x - origin.x) / cell).floor() as i64;
        let row = ((p.world.y - origin.y) / cell).floor() as i64;
        let key = (col - first_col) + (row - first_row) * num_cells_x;

        match by_key.get(&key) {
            Some(&slot) => clusters[slot].members.push(p.index),
            None => {
                let left = origin.x + col as f64 * cell;
                let top = origin.y + row as f64 * cell;
                by_key.insert(key, clusters.len());
                clusters.push(Cluster {
                    id: clusters.len(),
                    location: p.location,
                    zoom: viewport.zoom,
                    bbox: PixelBox {
                        left,
                        right: left + cell,
                        top,
                        bottom: top + cell,
                    },
                    members: vec![p.index],
                });
            }
        }
    }

    clusters
}
