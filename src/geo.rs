//! Geographic computations.
//!
//! Platform-agnostic formulas for the way-finding core: great-circle
//! distance, initial bearing, compass sectors, and the walking-time
//! estimate. All coordinates use WGS84 (lat/lng in degrees).

use serde::{Deserialize, Serialize};

/// A geographic coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Earth radius in kilometers (spherical model).
///
/// The guidance and arrival thresholds were tuned against this radius;
/// keep it in sync with them rather than switching to an ellipsoid.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distance at or below which full directional guidance is offered, in km.
pub const GUIDANCE_RANGE_KM: f64 = 3.0;

/// Distance below which the user counts as arrived, in km.
pub const ARRIVAL_RANGE_KM: f64 = 0.05;

/// Walking pace used for the time estimate, in minutes per kilometer.
pub const WALK_MINUTES_PER_KM: f64 = 12.0;

/// Haversine great-circle distance between two points in kilometers.
pub fn distance_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let h = (dlat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (dlng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Initial compass bearing to travel from `a` toward `b` along the
/// great circle, in degrees [0, 360). 0 is true north, clockwise.
///
/// For `a == b` both atan2 arguments are zero and the result is 0.
pub fn bearing_deg(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let y = dlng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlng.cos();

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Eight-way compass sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compass {
    North,
    Northeast,
    East,
    Southeast,
    South,
    Southwest,
    West,
    Northwest,
}

impl Compass {
    /// Sector for a bearing in degrees.
    ///
    /// Sectors are 45° wide and centered on each compass point, so the
    /// boundaries fall at 22.5°, 67.5°, and so on; a bearing exactly on
    /// a boundary resolves to the higher sector.
    pub fn from_bearing(bearing_deg: f64) -> Self {
        const SECTORS: [Compass; 8] = [
            Compass::North,
            Compass::Northeast,
            Compass::East,
            Compass::Southeast,
            Compass::South,
            Compass::Southwest,
            Compass::West,
            Compass::Northwest,
        ];
        SECTORS[(bearing_deg / 45.0).round() as usize % 8]
    }

    /// Sector used by the guidance sentence, written as the half-open
    /// boundary chain that partitions [0, 360): [337.5, 360) and
    /// [0, 22.5) are north, [22.5, 67.5) is northeast, and so on.
    ///
    /// Agrees with `from_bearing` on every bearing; kept in this form
    /// because the sentence table is defined by these ranges.
    pub fn guidance_sector(bearing_deg: f64) -> Self {
        if !(22.5..337.5).contains(&bearing_deg) {
            Compass::North
        } else if bearing_deg < 67.5 {
            Compass::Northeast
        } else if bearing_deg < 112.5 {
            Compass::East
        } else if bearing_deg < 157.5 {
            Compass::Southeast
        } else if bearing_deg < 202.5 {
            Compass::South
        } else if bearing_deg < 247.5 {
            Compass::Southwest
        } else if bearing_deg < 292.5 {
            Compass::West
        } else {
            Compass::Northwest
        }
    }

    /// Map abbreviation ("N", "NE", ...).
    pub fn abbrev(self) -> &'static str {
        match self {
            Compass::North => "N",
            Compass::Northeast => "NE",
            Compass::East => "E",
            Compass::Southeast => "SE",
            Compass::South => "S",
            Compass::Southwest => "SW",
            Compass::West => "W",
            Compass::Northwest => "NW",
        }
    }
}

/// Estimated walking time for a distance, in minutes (rounded up).
pub fn walk_minutes(distance_km: f64) -> f64 {
    (distance_km * WALK_MINUTES_PER_KM).ceil()
}

/// Format a distance for display: whole meters below 1 km, one-decimal
/// kilometers otherwise.
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{}m", (km * 1000.0).round() as i64)
    } else {
        format!("{km:.1}km")
    }
}
