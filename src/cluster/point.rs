//! Geographic and pixel-space value types plus the cluster model

use super::item_set::ItemSet;

/// Coordinate represents a geographic location
///
/// Latitude is in `[-90, 90]` and longitude in `[-180, 180]`, both in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
    /// Altitude in meters, if known
    pub altitude: Option<f64>,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
        }
    }

    pub fn with_altitude(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: Some(altitude),
        }
    }

    /// Whether both latitude and longitude are finite numbers
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// Position in the pixel space of one zoom level
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned pixel rectangle
///
/// A box whose `left` is greater than its `right` straddles the tile
/// boundary: it covers `[left, map_width)` and `[0, right]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelBox {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl PixelBox {
    /// Box of half-size `radius` centered on `center`, with its horizontal
    /// excess wrapped to the opposite edge of a `map_width` wide map
    ///
    /// A box at least as wide as the map spans it entirely and does not wrap.
    pub fn around(center: PixelPoint, radius: f64, map_width: f64) -> Self {
        let top = center.y - radius;
        let bottom = center.y + radius;
        if 2.0 * radius >= map_width {
            return Self {
                left: 0.0,
                right: map_width,
                top,
                bottom,
            };
        }

        let mut left = center.x - radius;
        let mut right = center.x + radius;
        if left < 0.0 {
            left += map_width;
        }
        if right > map_width {
            right -= map_width;
        }

        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    pub fn wraps(&self) -> bool {
        self.left > self.right
    }

    pub fn contains(&self, p: PixelPoint) -> bool {
        if p.y < self.top || p.y > self.bottom {
            return false;
        }
        if self.wraps() {
            p.x >= self.left || p.x <= self.right
        } else {
            p.x >= self.left && p.x <= self.right
        }
    }

    /// Horizontal extent, measured around the wrap if the box straddles it
    pub fn width(&self, map_width: f64) -> f64 {
        if self.wraps() {
            self.right + map_width - self.left
        } else {
            self.right - self.left
        }
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Item pairs an opaque caller payload with its location
#[derive(Debug, Clone, PartialEq)]
pub struct Item<T> {
    pub payload: T,
    pub location: Coordinate,
}

impl<T> Item<T> {
    pub fn new(payload: T, location: Coordinate) -> Self {
        Self { payload, location }
    }
}

/// Cluster is the result of one clustering pass for one marker
///
/// Clusters are rebuilt from scratch on every pass; a cluster from an
/// older pass must never be merged with a newer one.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    /// Position within the pass that created it
    pub id: usize,
    /// Where the marker is drawn
    pub location: Coordinate,
    /// Zoom level the pass ran at
    pub zoom: u8,
    /// Extent in world pixel space at `zoom`
    pub bbox: PixelBox,
    /// Indices into the item set the pass ran over, in assignment order
    pub members: Vec<usize>,
}

/// What kind of visual a cluster should be materialized as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterKind {
    /// Exactly one member; carries its item index
    Single(usize),
    /// Two or more members
    Group(usize),
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_single(&self) -> bool {
        self.members.len() == 1
    }

    /// First item assigned to the cluster
    pub fn anchor(&self) -> Option<usize> {
        self.members.first().copied()
    }

    pub fn kind(&self) -> ClusterKind {
        match self.members.as_slice() {
            [only] => ClusterKind::Single(*only),
            members => ClusterKind::Group(members.len()),
        }
    }

    /// Calculates mean coordinate and geographic bounds of the members
    ///
    /// Returns `(center, min, max)` where `min` is the south-west and
    /// `max` the north-east corner, or `None` if no member index resolves
    /// in `items`.
    pub fn centroid_and_bounds<T>(
        &self,
        items: &ItemSet<T>,
    ) -> Option<(Coordinate, Coordinate, Coordinate)> {
        let mut min = Coordinate::new(90.0, 180.0);
        let mut max = Coordinate::new(-90.0, -180.0);
        let mut center = Coordinate::new(0.0, 0.0);
        let mut count = 0usize;

        for item in self.members.iter().filter_map(|&i| items.get(i)) {
            let loc = item.location;
            center.latitude += loc.latitude;
            center.longitude += loc.longitude;
            min.latitude = min.latitude.min(loc.latitude);
            min.longitude = min.longitude.min(loc.longitude);
            max.latitude = max.latitude.max(loc.latitude);
            max.longitude = max.longitude.max(loc.longitude);
            count += 1;
        }

        if count == 0 {
            return None;
        }

        center.latitude /= count as f64;
        center.longitude /= count as f64;

        Some((center, min, max))
    }
}
