//! Power-of-two tile pyramid projection (Web Mercator)

use std::f64::consts::PI;

use super::point::{Coordinate, PixelPoint};

/// Edge length of one tile in pixels
pub const TILE_SIZE: f64 = 256.0;

/// Deepest zoom level clustering is defined for
pub const MAX_ZOOM: u8 = 21;

/// Latitude limit of the square Mercator map
pub const LATITUDE_MAX: f64 = 85.051_128_779_806_59;

/// Width (and height) of the whole projected map at `zoom`
pub fn map_width_px(zoom: u8) -> f64 {
    TILE_SIZE * 2f64.powi(i32::from(zoom))
}

/// Projects a coordinate to world pixel space at `zoom`
///
/// `(0°, 0°)` lands in the middle of the map; x grows eastward and y
/// southward.
pub fn to_pixel(coordinate: &Coordinate, zoom: u8) -> PixelPoint {
    let size = map_width_px(zoom);
    let latitude = coordinate.latitude.clamp(-LATITUDE_MAX, LATITUDE_MAX);
    let sin = latitude.to_radians().sin();

    let x = (coordinate.longitude + 180.0) / 360.0 * size;
    let y = (0.5 - ((1.0 + sin) / (1.0 - sin)).ln() / (4.0 * PI)) * size;

    PixelPoint::new(x, y)
}

/// Inverse of [`to_pixel`]
pub fn from_pixel(pixel: &PixelPoint, zoom: u8) -> Coordinate {
    let size = map_width_px(zoom);
    let longitude = pixel.x / size * 360.0 - 180.0;
    let n = PI - 2.0 * PI * pixel.y / size;
    let latitude = n.sinh().atan().to_degrees();

    Coordinate::new(latitude, longitude)
}

/// Moves an x coordinate, relative to the left edge of a `width` wide
/// visible range, across the antimeridian when that brings it within
/// `radius` of the range
///
/// A point just east of the antimeridian projects to the far left of the
/// map; seen from a viewport at the right edge it belongs next to the
/// right edge, and vice versa.
pub fn wrap_x(x: f64, width: f64, radius: f64, map_width: f64) -> f64 {
    if x > width + radius && x - map_width >= -radius {
        x - map_width
    } else if x < -radius && x + map_width <= width + radius {
        x + map_width
    } else {
        x
    }
}

/// The visible part of the map
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width_px: u32,
    pub height_px: u32,
    pub zoom: u8,
    /// Geographic point under the middle of the viewport
    pub center: Coordinate,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width_px: 1024,
            height_px: 768,
            zoom: 2,
            center: Coordinate::new(0.0, 0.0),
        }
    }
}

impl Viewport {
    pub fn new(width_px: u32, height_px: u32, zoom: u8, center: Coordinate) -> Self {
        Self {
            width_px,
            height_px,
            zoom,
            center,
        }
    }

    pub fn with_zoom(self, zoom: u8) -> Self {
        Self { zoom, ..self }
    }

    pub fn with_center(self, center: Coordinate) -> Self {
        Self { center, ..self }
    }

    pub fn with_size(self, width_px: u32, height_px: u32) -> Self {
        Self {
            width_px,
            height_px,
            ..self
        }
    }

    pub fn width(&self) -> f64 {
        f64::from(self.width_px)
    }

    pub fn height(&self) -> f64 {
        f64::from(self.height_px)
    }

    pub fn is_clusterable(&self) -> bool {
        self.zoom <= MAX_ZOOM
    }

    /// World pixel under the top-left corner of the viewport
    pub fn top_left(&self) -> PixelPoint {
        let c = to_pixel(&self.center, self.zoom);
        PixelPoint::new(c.x - self.width() / 2.0, c.y - self.height() / 2.0)
    }

    /// Whether a viewport-relative pixel lies in the view grown by `radius`
    /// on every side
    pub fn contains_expanded(&self, screen: PixelPoint, radius: f64) -> bool {
        screen.x >= -radius
            && screen.x <= self.width() + radius
            && screen.y >= -radius
            && screen.y <= self.height() + radius
    }
}
