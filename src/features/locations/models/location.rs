use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

use super::Coordinates;

/// Geocode status enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "geocode_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GeocodeStatus {
    /// No coordinates yet and no lookup attempted
    Pending,
    /// Coordinates came from the geocoding provider
    Resolved,
    /// The last lookup produced nothing usable
    Unresolved,
    /// Coordinates were entered by an operator
    Manual,
}

impl std::fmt::Display for GeocodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeocodeStatus::Pending => write!(f, "pending"),
            GeocodeStatus::Resolved => write!(f, "resolved"),
            GeocodeStatus::Unresolved => write!(f, "unresolved"),
            GeocodeStatus::Manual => write!(f, "manual"),
        }
    }
}

/// Database model for an office location
#[derive(Debug, Clone, FromRow)]
pub struct Location {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_active: bool,
    pub geocode_status: GeocodeStatus,
    pub geocoded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Location {
    /// Both coordinates, or nothing
    pub fn coordinates(&self) -> Option<Coordinates> {
        Coordinates::from_pair(self.latitude, self.longitude)
    }

    pub fn has_coordinates(&self) -> bool {
        self.coordinates().is_some()
    }

    /// Record a provider result
    pub fn apply_geocode(&mut self, point: Coordinates, at: DateTime<Utc>) {
        self.latitude = Some(point.latitude);
        self.longitude = Some(point.longitude);
        self.geocode_status = GeocodeStatus::Resolved;
        self.geocoded_at = Some(at);
    }

    pub fn set_manual_coordinates(&mut self, point: Coordinates) {
        self.latitude = Some(point.latitude);
        self.longitude = Some(point.longitude);
        self.geocode_status = GeocodeStatus::Manual;
    }

    pub fn clear_coordinates(&mut self) {
        self.latitude = None;
        self.longitude = None;
        self.geocode_status = GeocodeStatus::Pending;
        self.geocoded_at = None;
    }
}

/// Data for creating a new location
#[derive(Debug, Clone)]
pub struct CreateLocation {
    pub name: String,
    pub slug: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_active: bool,
    pub geocode_status: GeocodeStatus,
}

/// Administrator change to the stored coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoordinatesUpdate {
    /// Operator supplied coordinates, status becomes `manual`
    Set(Coordinates),
    /// Back to no coordinates, status becomes `pending`
    Clear,
}

/// Partial update of an existing location.
///
/// `None` leaves the stored column as it is, so a write never carries values
/// read before a concurrent geocode.
#[derive(Debug, Clone)]
pub struct UpdateLocation {
    pub id: Uuid,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
    pub coordinates: Option<CoordinatesUpdate>,
}
