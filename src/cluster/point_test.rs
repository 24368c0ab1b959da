#[cfg(test)]
mod tests {
    use super::super::*;

    fn cluster(members: Vec<usize>) -> Cluster {
        Cluster {
            id: 0,
            location: Coordinate::new(0.0, 0.0),
            zoom: 10,
            bbox: PixelBox::default(),
            members,
        }
    }

    #[test]
    fn test_centroid_and_bounds() {
        let items: ItemSet<&str> = vec![
            Item::new("a", Coordinate::new(59.955982, 30.244759)),
            Item::new("b", Coordinate::new(59.955975, 30.24472)),
            Item::new("c", Coordinate::new(59.96698, 30.244358)),
        ]
        .into();
        let c1 = cluster(vec![0, 1, 2]);

        let (center, min, max) = c1.centroid_and_bounds(&items).unwrap();
        assert_eq!(center.longitude, 30.244612333333333);
        assert_eq!(center.latitude, 59.95964566666667);
        assert_eq!(min.longitude, 30.244358);
        assert_eq!(min.latitude, 59.955975);
        assert_eq!(max.longitude, 30.244759);
        assert_eq!(max.latitude, 59.96698);

        assert!(cluster(vec![7]).centroid_and_bounds(&items).is_none());
    }

    #[test]
    fn test_cluster_kind() {
        assert_eq!(cluster(vec![4]).kind(), ClusterKind::Single(4));
        assert_eq!(cluster(vec![4, 2, 9]).kind(), ClusterKind::Group(3));
        assert!(cluster(vec![4]).is_single());
        assert_eq!(cluster(vec![4, 2]).anchor(), Some(4));
        assert_eq!(cluster(vec![4, 2]).len(), 2);
    }

    #[test]
    fn test_coordinate_finiteness() {
        assert!(Coordinate::new(1.0, 2.0).is_finite());
        assert!(Coordinate::with_altitude(1.0, 2.0, f64::NAN).is_finite());
        assert!(!Coordinate::new(f64::NAN, 2.0).is_finite());
        assert!(!Coordinate::new(1.0, f64::INFINITY).is_finite());
    }

    #[test]
    fn test_box_inside_map() {
        let b = PixelBox::around(PixelPoint::new(500.0, 300.0), 40.0, 1024.0);
        assert!(!b.wraps());
        assert_eq!((b.left, b.right, b.top, b.bottom), (460.0, 540.0, 260.0, 340.0));
        assert_eq!(b.width(1024.0), 80.0);
        assert_eq!(b.height(), 80.0);
        assert!(b.contains(PixelPoint::new(460.0, 340.0)));
        assert!(!b.contains(PixelPoint::new(541.0, 300.0)));
        assert!(!b.contains(PixelPoint::new(500.0, 259.0)));
    }

    #[test]
    fn test_box_wraps_across_edge() {
        let right_edge = PixelBox::around(PixelPoint::new(1010.0, 300.0), 40.0, 1024.0);
        assert!(right_edge.wraps());
        assert_eq!((right_edge.left, right_edge.right), (970.0, 26.0));
        assert_eq!(right_edge.width(1024.0), 80.0);
        assert!(right_edge.contains(PixelPoint::new(1020.0, 300.0)));
        assert!(right_edge.contains(PixelPoint::new(10.0, 300.0)));
        assert!(!right_edge.contains(PixelPoint::new(500.0, 300.0)));

        let left_edge = PixelBox::around(PixelPoint::new(5.0, 300.0), 40.0, 1024.0);
        assert!(left_edge.wraps());
        assert_eq!((left_edge.left, left_edge.right), (989.0, 45.0));
        assert!(left_edge.contains(PixelPoint::new(1000.0, 300.0)));
    }

    #[test]
    fn test_box_wider_than_map_spans_it() {
        let b = PixelBox::around(PixelPoint::new(10.0, 20.0), 130.0, 256.0);
        assert!(!b.wraps());
        assert_eq!((b.left, b.right), (0.0, 256.0));
        assert_eq!((b.top, b.bottom), (-110.0, 150.0));
        assert!(b.contains(PixelPoint::new(10.0, 20.0)));
        assert!(b.contains(PixelPoint::new(250.0, 20.0)));
    }
}
