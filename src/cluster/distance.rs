use std::f64::consts::PI;

use super::point::Coordinate;

/// Coefficient to translate from degrees to radians
pub const DEGREE_RAD: f64 = PI / 180.0;

/// Mean Earth radius in kilometers
pub const EARTH_R: f64 = 6378.135;

/// Distance unit for great-circle computations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Unit {
    #[default]
    Kilometers,
    Meters,
    Miles,
    NauticalMiles,
}

impl Unit {
    /// How many of this unit make up one kilometer
    pub fn per_km(self) -> f64 {
        match self {
            Unit::Kilometers => 1.0,
            Unit::Meters => 1000.0,
            Unit::Miles => 1.0 / 1.609_344,
            Unit::NauticalMiles => 1.0 / 1.852,
        }
    }

    /// Earth radius expressed in this unit
    pub fn earth_radius(self) -> f64 {
        EARTH_R * self.per_km()
    }
}

/// Converts a distance between units
pub fn convert(value: f64, from: Unit, to: Unit) -> f64 {
    value / from.per_km() * to.per_km()
}

/// Converts degrees to radians
pub fn to_radians(degrees: f64) -> f64 {
    degrees * DEGREE_RAD
}

/// Converts radians to degrees
pub fn to_degrees(radians: f64) -> f64 {
    radians / DEGREE_RAD
}

/// Great-circle distance between two coordinates (haversine)
///
/// Symmetric in its arguments and exactly zero for identical inputs.
pub fn haversine_distance(a: &Coordinate, b: &Coordinate, unit: Unit) -> f64 {
    if a == b {
        return 0.0;
    }

    let lat1 = to_radians(a.latitude);
    let lat2 = to_radians(b.latitude);
    let dlat = to_radians(b.latitude - a.latitude);
    let dlon = to_radians(b.longitude - a.longitude);

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    unit.earth_radius() * c
}

/// Initial bearing from `a` to `b` in degrees, `[0, 360)`
///
/// 0 is north, 90 is east. Returns 0 when both points coincide.
pub fn initial_heading(a: &Coordinate, b: &Coordinate) -> f64 {
    if a == b {
        return 0.0;
    }

    let lat1 = to_radians(a.latitude);
    let lat2 = to_radians(b.latitude);
    let dlon = to_radians(b.longitude - a.longitude);

    let x = dlon.sin() * lat2.cos();
    let y = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();

    normalize_heading(to_degrees(x.atan2(y)))
}

/// Point reached by travelling `distance` from `origin` along the great
/// circle starting at `heading` degrees
pub fn destination_point(
    origin: &Coordinate,
    heading: f64,
    distance: f64,
    unit: Unit,
) -> Coordinate {
    let delta = distance / unit.earth_radius();
    let theta = to_radians(heading);
    let lat1 = to_radians(origin.latitude);
    let lon1 = to_radians(origin.longitude);

    let sin_lat2 = lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();
    let lon2 = lon1
        + (theta.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * sin_lat2);

    Coordinate::new(to_degrees(lat2), normalize_longitude(to_degrees(lon2)))
}

/// Point on the shorter great-circle arc equidistant from `a` and `b`
pub fn midpoint(a: &Coordinate, b: &Coordinate) -> Coordinate {
    let lat1 = to_radians(a.latitude);
    let lat2 = to_radians(b.latitude);
    let lon1 = to_radians(a.longitude);
    let dlon = to_radians(b.longitude - a.longitude);

    let bx = lat2.cos() * dlon.cos();
    let by = lat2.cos() * dlon.sin();

    let lat = (lat1.sin() + lat2.sin()).atan2(((lat1.cos() + bx).powi(2) + by * by).sqrt());
    let lon = lon1 + by.atan2(lat1.cos() + bx);

    Coordinate::new(to_degrees(lat), normalize_longitude(to_degrees(lon)))
}

fn normalize_heading(degrees: f64) -> f64 {
    let h = degrees.rem_euclid(360.0);
    // rem_euclid of a tiny negative value rounds up to 360
    if h >= 360.0 { 0.0 } else { h }
}

fn normalize_longitude(degrees: f64) -> f64 {
    let lon = (degrees + 180.0).rem_euclid(360.0) - 180.0;
    if lon == -180.0 && degrees > 0.0 { 180.0 } else { lon }
}
