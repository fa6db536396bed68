use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::features::locations::models::Coordinates;

/// Database model for a contact inquiry
#[derive(Debug, Clone, FromRow)]
pub struct Inquiry {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub message: String,
    pub location_id: Option<Uuid>,
    pub sender_latitude: Option<f64>,
    pub sender_longitude: Option<f64>,
    /// Kilometres between sender and location, 2 decimals
    pub distance_km: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Inquiry {
    pub fn sender_coordinates(&self) -> Option<Coordinates> {
        Coordinates::from_pair(self.sender_latitude, self.sender_longitude)
    }
}

/// Data for creating a new inquiry
#[derive(Debug, Clone)]
pub struct CreateInquiry {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub message: String,
    pub location_id: Option<Uuid>,
    pub sender_latitude: Option<f64>,
    pub sender_longitude: Option<f64>,
    pub distance_km: Option<f64>,
}
