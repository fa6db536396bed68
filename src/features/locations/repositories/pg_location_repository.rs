use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::database::is_unique_violation;
use crate::core::error::{AppError, Result};
use crate::features::locations::models::{
    CoordinatesUpdate, CreateLocation, GeocodeStatus, Location, UpdateLocation,
};

use super::{LocationRepository, SlugWrite};

/// PostgreSQL backed location storage
pub struct PgLocationRepository {
    pool: PgPool,
}

impl PgLocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LocationRepository for PgLocationRepository {
    async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM locations
                WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(slug)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check slug availability: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(exists)
    }

    async fn insert(&self, data: &CreateLocation) -> Result<SlugWrite<Location>> {
        let inserted = sqlx::query_as::<_, Location>(
            r#"
            INSERT INTO locations (
                name, slug, address, latitude, longitude, is_active, geocode_status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (slug) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.slug)
        .bind(&data.address)
        .bind(data.latitude)
        .bind(data.longitude)
        .bind(data.is_active)
        .bind(data.geocode_status)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert location: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(match inserted {
            Some(location) => SlugWrite::Written(location),
            None => SlugWrite::SlugTaken,
        })
    }

    async fn update(&self, changes: &UpdateLocation) -> Result<SlugWrite<Location>> {
        let (touch_coordinates, latitude, longitude, geocode_status) = match changes.coordinates {
            Some(CoordinatesUpdate::Set(point)) => (
                true,
                Some(point.latitude),
                Some(point.longitude),
                Some(GeocodeStatus::Manual),
            ),
            Some(CoordinatesUpdate::Clear) => (true, None, None, Some(GeocodeStatus::Pending)),
            None => (false, None, None, None),
        };
        let clear_coordinates = matches!(changes.coordinates, Some(CoordinatesUpdate::Clear));

        let result = sqlx::query_as::<_, Location>(
            r#"
            UPDATE locations
            SET name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                address = COALESCE($4, address),
                is_active = COALESCE($5, is_active),
                latitude = CASE WHEN $6 THEN $7 ELSE latitude END,
                longitude = CASE WHEN $6 THEN $8 ELSE longitude END,
                geocode_status = CASE WHEN $6 THEN $9 ELSE geocode_status END,
                geocoded_at = CASE WHEN $10 THEN NULL ELSE geocoded_at END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(changes.id)
        .bind(&changes.name)
        .bind(&changes.slug)
        .bind(&changes.address)
        .bind(changes.is_active)
        .bind(touch_coordinates)
        .bind(latitude)
        .bind(longitude)
        .bind(geocode_status)
        .bind(clear_coordinates)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(Some(updated)) => Ok(SlugWrite::Written(updated)),
            Ok(None) => Err(AppError::NotFound(format!(
                "Location '{}' not found",
                changes.id
            ))),
            Err(e) if is_unique_violation(&e) => Ok(SlugWrite::SlugTaken),
            Err(e) => {
                tracing::error!("Failed to update location {}: {:?}", changes.id, e);
                Err(AppError::Database(e))
            }
        }
    }

    async fn save_geocode(&self, location: &Location) -> Result<Location> {
        let updated = sqlx::query_as::<_, Location>(
            r#"
            UPDATE locations
            SET latitude = $2,
                longitude = $3,
                geocode_status = $4,
                geocoded_at = $5,
                updated_at = NOW()
            WHERE id = $1 AND latitude IS NULL
            RETURNING *
            "#,
        )
        .bind(location.id)
        .bind(location.latitude)
        .bind(location.longitude)
        .bind(location.geocode_status)
        .bind(location.geocoded_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to save geocode for location {}: {:?}", location.id, e);
            AppError::Database(e)
        })?;

        if let Some(updated) = updated {
            return Ok(updated);
        }

        // Either the row is gone or it gained coordinates in the meantime
        self.find_by_id(location.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Location '{}' not found", location.id)))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Location>> {
        sqlx::query_as::<_, Location>("SELECT * FROM locations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch location {}: {:?}", id, e);
                AppError::Database(e)
            })
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Location>> {
        sqlx::query_as::<_, Location>("SELECT * FROM locations WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch location by slug '{}': {:?}", slug, e);
                AppError::Database(e)
            })
    }

    async fn list(&self, active_only: bool) -> Result<Vec<Location>> {
        sqlx::query_as::<_, Location>(
            r#"
            SELECT * FROM locations
            WHERE ($1 = FALSE OR is_active = TRUE)
            ORDER BY name ASC, slug ASC
            "#,
        )
        .bind(active_only)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list locations: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let detached = sqlx::query(
            r#"
            UPDATE inquiries
            SET location_id = NULL, distance_km = NULL, updated_at = NOW()
            WHERE location_id = $1
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let deleted = sqlx::query("DELETE FROM locations WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        if deleted > 0 {
            tracing::debug!("Deleted location {}, detached {} inquiries", id, detached);
        }

        Ok(deleted > 0)
    }
}
