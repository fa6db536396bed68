use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::locations::models::{GeocodeStatus, Location};
use crate::features::locations::services::GeocodeOutcome;

/// Request DTO for creating a location
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct CreateLocationDto {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    /// Optional explicit slug. Normalized and made unique; derived from the name when omitted.
    #[validate(length(min = 1, max = 255, message = "Slug must be 1-255 characters"))]
    pub slug: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Address must be 1-255 characters"))]
    pub address: String,

    /// Operator supplied coordinates. Both or neither.
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be within [-90, 90]"))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be within [-180, 180]"))]
    pub longitude: Option<f64>,

    pub is_active: Option<bool>,
}

/// Request DTO for updating a location. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
pub struct UpdateLocationDto {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Slug must be 1-255 characters"))]
    pub slug: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Address must be 1-255 characters"))]
    pub address: Option<String>,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be within [-90, 90]"))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be within [-180, 180]"))]
    pub longitude: Option<f64>,

    pub is_active: Option<bool>,

    /// Drop stored coordinates so the next lookup geocodes the address again
    #[serde(default)]
    pub clear_coordinates: bool,
}

/// Query params for listing locations
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListLocationsQuery {
    /// Only return active locations
    #[serde(default)]
    pub active: bool,
}

/// Response DTO for location
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LocationResponseDto {
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

impl From<Location> for LocationResponseDto {
    fn from(l: Location) -> Self {
        Self {
            id: l.id,
            name: l.name,
            slug: l.slug,
            address: l.address,
            latitude: l.latitude,
            longitude: l.longitude,
            is_active: l.is_active,
            geocode_status: l.geocode_status,
            geocoded_at: l.geocoded_at,
            created_at: l.created_at,
            updated_at: l.updated_at,
        }
    }
}

/// Result of a single geocoding attempt
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GeocodeOutcomeDto {
    pub resolved: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Why nothing was resolved, e.g. "timeout" or "no_results"
    pub reason: Option<String>,
}

impl From<GeocodeOutcome> for GeocodeOutcomeDto {
    fn from(outcome: GeocodeOutcome) -> Self {
        match outcome {
            GeocodeOutcome::Resolved(point) => Self {
                resolved: true,
                latitude: Some(point.latitude),
                longitude: Some(point.longitude),
                reason: None,
            },
            GeocodeOutcome::Unresolved(reason) => Self {
                resolved: false,
                latitude: None,
                longitude: None,
                reason: Some(reason.to_string()),
            },
        }
    }
}

/// Response DTO for an explicit geocode request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GeocodeResponseDto {
    pub location: LocationResponseDto,
    pub outcome: GeocodeOutcomeDto,
}
