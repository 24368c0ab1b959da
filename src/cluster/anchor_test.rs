#[cfg(test)]
mod tests {
    use crate::cluster::{
        Algorithm, Cluster, Coordinate, Item, ItemSet, PixelPoint, Viewport, from_pixel,
        map_width_px, recluster,
    };

    const ZOOM: u8 = 10;
    const RADIUS: f64 = 40.0;
    const ORIGIN: f64 = 131_072.0;

    fn item_at(id: usize, x: f64, y: f64) -> Item<usize> {
        Item::new(id, from_pixel(&PixelPoint::new(x, y), ZOOM))
    }

    fn boxes(items: &ItemSet<usize>, vp: &Viewport) -> Vec<Cluster> {
        recluster(items, vp, RADIUS, Algorithm::PointBased)
            .unwrap()
            .unwrap()
    }

    fn members(clusters: &[Cluster]) -> Vec<Vec<usize>> {
        clusters.iter().map(|c| c.members.clone()).collect()
    }

    fn viewport() -> Viewport {
        Viewport::new(800, 600, ZOOM, Coordinate::new(0.0, 0.0))
    }

    #[test]
    fn test_first_match_not_chained() {
        // B within radius of A, C within radius of B but not of A
        let items: ItemSet<usize> = vec![
            item_at(0, ORIGIN, ORIGIN),
            item_at(1, ORIGIN + 24.0, ORIGIN),
            item_at(2, ORIGIN + 48.0, ORIGIN),
        ]
        .into();

        let clusters = boxes(&items, &viewport());
        assert_eq!(members(&clusters), vec![vec![0, 1], vec![2]]);
        assert_eq!(clusters[0].location, items.get(0).unwrap().location);
        assert_eq!(clusters[1].location, items.get(2).unwrap().location);
    }

    #[test]
    fn test_earliest_box_wins_over_closest() {
        let items: ItemSet<usize> = vec![
            item_at(0, ORIGIN, ORIGIN),
            item_at(1, ORIGIN + 60.0, ORIGIN),
            // inside both boxes, nearer the second anchor
            item_at(2, ORIGIN + 32.0, ORIGIN),
        ]
        .into();

        let clusters = boxes(&items, &viewport());
        assert_eq!(members(&clusters), vec![vec![0, 2], vec![1]]);
    }

    #[test]
    fn test_insertion_order_picks_anchor() {
        let items: ItemSet<usize> = vec![
            item_at(0, ORIGIN + 48.0, ORIGIN),
            item_at(1, ORIGIN + 24.0, ORIGIN),
            item_at(2, ORIGIN, ORIGIN),
        ]
        .into();

        let clusters = boxes(&items, &viewport());
        assert_eq!(members(&clusters), vec![vec![0, 1], vec![2]]);
        assert_eq!(clusters[0].location, items.get(0).unwrap().location);
    }

    #[test]
    fn test_box_centered_on_anchor() {
        let items: ItemSet<usize> = vec![item_at(0, ORIGIN + 5.0, ORIGIN - 7.0)].into();

        let bbox = boxes(&items, &viewport())[0].bbox;
        assert!((bbox.left - (ORIGIN - 35.0)).abs() < 1e-6);
        assert!((bbox.right - (ORIGIN + 45.0)).abs() < 1e-6);
        assert!((bbox.top - (ORIGIN - 47.0)).abs() < 1e-6);
        assert!((bbox.bottom - (ORIGIN + 33.0)).abs() < 1e-6);
    }

    #[test]
    fn test_clusters_across_antimeridian() {
        let items: ItemSet<usize> = vec![
            Item::new(0, Coordinate::new(0.0, 179.99)),
            Item::new(1, Coordinate::new(0.0, -179.99)),
        ]
        .into();
        let vp = viewport().with_center(Coordinate::new(0.0, 180.0));

        let clusters = boxes(&items, &vp);
        assert_eq!(members(&clusters), vec![vec![0, 1]]);
        let bbox = clusters[0].bbox;
        assert!(bbox.wraps());
        assert!((bbox.width(map_width_px(ZOOM)) - 2.0 * RADIUS).abs() < 1e-6);

        let cells = recluster(&items, &vp, RADIUS, Algorithm::GridBased)
            .unwrap()
            .unwrap();
        assert_eq!(members(&cells), vec![vec![0, 1]]);
    }

    #[test]
    fn test_radius_wider_than_map_groups_everything() {
        // 256 px world at zoom 0, boxes 260 px wide
        let vp = Viewport::new(256, 256, 0, Coordinate::new(0.0, 0.0));
        let at = |id, x, y| Item::new(id, from_pixel(&PixelPoint::new(x, y), 0));
        let items: ItemSet<usize> =
            vec![at(0, 10.0, 20.0), at(1, 10.0, 20.0), at(2, 240.0, 30.0)].into();

        let clusters = recluster(&items, &vp, 130.0, Algorithm::PointBased)
            .unwrap()
            .unwrap();
        assert_eq!(members(&clusters), vec![vec![0, 1, 2]]);
        let bbox = clusters[0].bbox;
        assert!(!bbox.wraps());
        assert_eq!((bbox.left, bbox.right), (0.0, map_width_px(0)));
    }
}
