use geo::{GeodesicDistance, Point};

use crate::features::locations::models::{Coordinates, Location};
use crate::shared::constants::DISTANCE_DECIMALS;

/// Geodesic distance calculations on the WGS84 ellipsoid
pub struct DistanceService;

impl DistanceService {
    /// Shortest distance over the ellipsoid in kilometres, unrounded
    pub fn geodesic_km(from: Coordinates, to: Coordinates) -> f64 {
        let a = Point::new(from.longitude, from.latitude);
        let b = Point::new(to.longitude, to.latitude);
        a.geodesic_distance(&b) / 1000.0
    }

    /// Round half away from zero to the stored precision
    pub fn round_km(km: f64) -> f64 {
        let factor = 10f64.powi(DISTANCE_DECIMALS);
        (km * factor).round() / factor
    }

    /// Distance from a location to a sender, if both points are known
    pub fn distance_km(location: &Location, sender: Option<Coordinates>) -> Option<f64> {
        let from = location.coordinates()?;
        let to = sender?;
        Some(Self::round_km(Self::geodesic_km(from, to)))
    }
}
