use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::inquiries::models::Inquiry;

/// Request DTO for submitting a contact inquiry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct CreateInquiryDto {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(max = 20, message = "Phone must not exceed 20 characters"))]
    pub phone: Option<String>,

    #[validate(length(max = 255, message = "Company must not exceed 255 characters"))]
    pub company: Option<String>,

    #[validate(length(min = 1, max = 5000, message = "Message must be 1-5000 characters"))]
    pub message: String,

    /// Office the inquiry is addressed to
    pub location_id: Option<Uuid>,

    /// Sender position, both or neither
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be within [-90, 90]"))]
    pub sender_latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be within [-180, 180]"))]
    pub sender_longitude: Option<f64>,
}

/// Request DTO for changing the distance inputs of an inquiry.
/// Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
pub struct UpdateInquiryDto {
    pub location_id: Option<Uuid>,

    /// Detach the inquiry from its location
    #[serde(default)]
    pub clear_location: bool,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be within [-90, 90]"))]
    pub sender_latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be within [-180, 180]"))]
    pub sender_longitude: Option<f64>,

    /// Forget the sender position
    #[serde(default)]
    pub clear_sender_coordinates: bool,
}

/// Query params for listing inquiries
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListInquiriesQuery {
    /// Only inquiries addressed to this location
    pub location_id: Option<Uuid>,
}

/// Response DTO for inquiry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InquiryResponseDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub message: String,
    pub location_id: Option<Uuid>,
    pub sender_latitude: Option<f64>,
    pub sender_longitude: Option<f64>,
    pub distance_km: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Inquiry> for InquiryResponseDto {
    fn from(i: Inquiry) -> Self {
        Self {
            id: i.id,
            name: i.name,
            email: i.email,
            phone: i.phone,
            company: i.company,
            message: i.message,
            location_id: i.location_id,
            sender_latitude: i.sender_latitude,
            sender_longitude: i.sender_longitude,
            distance_km: i.distance_km,
            created_at: i.created_at,
            updated_at: i.updated_at,
        }
    }
}
