use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A WGS84 point in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Build a point, rejecting values outside the valid degree ranges
    pub fn try_new(latitude: f64, longitude: f64) -> Option<Self> {
        let point = Self {
            latitude,
            longitude,
        };
        point.is_valid().then_some(point)
    }

    /// Combine two nullable columns. A half-set pair counts as absent.
    pub fn from_pair(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(lat), Some(lon)) => Some(Self {
                latitude: lat,
                longitude: lon,
            }),
            _ => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_new_bounds() {
        assert!(Coordinates::try_new(90.0, 180.0).is_some());
        assert!(Coordinates::try_new(-90.0, -180.0).is_some());
        assert!(Coordinates::try_new(90.0001, 0.0).is_none());
        assert!(Coordinates::try_new(0.0, 180.5).is_none());
        assert!(Coordinates::try_new(f64::NAN, 0.0).is_none());
    }

    #[test]
    fn test_zero_is_a_real_coordinate() {
        let origin = Coordinates::from_pair(Some(0.0), Some(0.0));
        assert_eq!(
            origin,
            Some(Coordinates {
                latitude: 0.0,
                longitude: 0.0
            })
        );
    }

    #[test]
    fn test_from_pair_requires_both() {
        assert!(Coordinates::from_pair(Some(1.0), None).is_none());
        assert!(Coordinates::from_pair(None, Some(1.0)).is_none());
        assert!(Coordinates::from_pair(None, None).is_none());
    }
}
