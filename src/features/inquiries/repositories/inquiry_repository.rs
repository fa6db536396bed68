use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::inquiries::models::{CreateInquiry, Inquiry};

/// Storage access for inquiries
#[async_trait]
pub trait InquiryRepository: Send + Sync {
    async fn insert(&self, data: &CreateInquiry) -> Result<Inquiry>;

    /// Write location, sender coordinates and distance of an existing row
    async fn update(&self, inquiry: &Inquiry) -> Result<Inquiry>;

    /// Write `inquiry.distance_km` only.
    ///
    /// Applies while the stored location and sender coordinates still equal
    /// the ones on `inquiry`, the inputs the distance was computed from.
    /// Returns `None` when they changed in the meantime or the row is gone.
    async fn save_distance(&self, inquiry: &Inquiry) -> Result<Option<Inquiry>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Inquiry>>;

    /// One page of inquiries, newest first, optionally restricted to one
    /// location, plus the total number of matching rows
    async fn list(
        &self,
        location_id: Option<Uuid>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Inquiry>, i64)>;
}
