use super::pass::Projected;
use super::point::{Cluster, PixelBox, PixelPoint};
use super::projection::map_width_px;

/// How many points are grouped between checks for a newer pass
const STALE_CHECK_INTERVAL: usize = 256;

/// Point-based clustering
///
/// Points are taken in item order. Each joins the earliest-created cluster
/// whose box contains it, even when a later box is geometrically closer;
/// otherwise it opens a new `2·radius` box centered on itself. Boxes that
/// would cross the tile edge wrap to the opposite side instead of being
/// clipped.
///
/// O(n·k) for k clusters. Returns `None` if `is_stale` reports the pass
/// was superseded.
pub fn anchor_clusters(
    points: &[Projected],
    zoom: u8,
    radius: f64,
    is_stale: &dyn Fn() -> bool,
) -> Option<Vec<Cluster>> {
    let map_width = map_width_px(zoom);
    let mut clusters: Vec<Cluster> = Vec::new();

    for (n, p) in points.iter().enumerate() {
        if n % STALE_CHECK_INTERVAL == 0 && n > 0 && is_stale() {
            return None;
        }

        // Boxes live on the unwrapped map, [0, map_width)
        let pixel = PixelPoint::new(p.world.x.rem_euclid(map_width), p.world.y);

        match clusters.iter_mut().find(|c| c.bbox.contains(pixel)) {
            Some(cluster) => cluster.members.push(p.index),
            None => clusters.push(Cluster {
                id: clusters.len(),
                location: p.location,
                zoom,
                bbox: PixelBox::around(pixel, radius, map_width),
                members: vec![p.index],
            }),
        }
    }

    Some(clusters)
}
