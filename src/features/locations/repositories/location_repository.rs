use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::locations::models::{CreateLocation, Location, UpdateLocation};

/// Outcome of a write that carries a slug
#[derive(Debug)]
pub enum SlugWrite<T> {
    Written(T),
    /// Another row claimed the slug between the availability check and the write
    SlugTaken,
}

/// Storage access for locations.
///
/// Implementations must enforce slug uniqueness at write time and report a
/// collision as [`SlugWrite::SlugTaken`] instead of an error.
#[async_trait]
pub trait LocationRepository: Send + Sync {
    /// Whether any location other than `exclude` already uses `slug`
    async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool>;

    async fn insert(&self, data: &CreateLocation) -> Result<SlugWrite<Location>>;

    /// Write only the columns `changes` sets. Coordinates and geocode state
    /// are left alone unless `changes.coordinates` is present.
    async fn update(&self, changes: &UpdateLocation) -> Result<SlugWrite<Location>>;

    /// Persist a geocoding result.
    ///
    /// Only applies while the stored row has no coordinates, so a lookup that
    /// finishes after an operator set coordinates never overwrites them. Returns
    /// the row as stored afterwards.
    async fn save_geocode(&self, location: &Location) -> Result<Location>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Location>>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Location>>;

    async fn list(&self, active_only: bool) -> Result<Vec<Location>>;

    /// Delete a location, detaching its inquiries in the same transaction.
    /// Returns false when nothing was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}
