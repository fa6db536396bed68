use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::inquiries::models::{CreateInquiry, Inquiry};

use super::InquiryRepository;

/// PostgreSQL backed inquiry storage
pub struct PgInquiryRepository {
    pool: PgPool,
}

impl PgInquiryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// A location removed between lookup and write surfaces as a foreign key error
fn map_write_error(e: sqlx::Error, action: &str) -> AppError {
    let fk_violation = e
        .as_database_error()
        .map(|d| d.is_foreign_key_violation())
        .unwrap_or(false);
    if fk_violation {
        return AppError::NotFound("Location not found".to_string());
    }
    tracing::error!("Failed to {} inquiry: {:?}", action, e);
    AppError::Database(e)
}

#[async_trait]
impl InquiryRepository for PgInquiryRepository {
    async fn insert(&self, data: &CreateInquiry) -> Result<Inquiry> {
        sqlx::query_as::<_, Inquiry>(
            r#"
            INSERT INTO inquiries (
                name, email, phone, company, message,
                location_id, sender_latitude, sender_longitude, distance_km
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&data.company)
        .bind(&data.message)
        .bind(data.location_id)
        .bind(data.sender_latitude)
        .bind(data.sender_longitude)
        .bind(data.distance_km)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "insert"))
    }

    async fn update(&self, inquiry: &Inquiry) -> Result<Inquiry> {
        sqlx::query_as::<_, Inquiry>(
            r#"
            UPDATE inquiries
            SET location_id = $2,
                sender_latitude = $3,
                sender_longitude = $4,
                distance_km = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(inquiry.id)
        .bind(inquiry.location_id)
        .bind(inquiry.sender_latitude)
        .bind(inquiry.sender_longitude)
        .bind(inquiry.distance_km)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "update"))?
        .ok_or_else(|| AppError::NotFound(format!("Inquiry '{}' not found", inquiry.id)))
    }

    async fn save_distance(&self, inquiry: &Inquiry) -> Result<Option<Inquiry>> {
        sqlx::query_as::<_, Inquiry>(
            r#"
            UPDATE inquiries
            SET distance_km = $5,
                updated_at = NOW()
            WHERE id = $1
              AND location_id IS NOT DISTINCT FROM $2::uuid
              AND sender_latitude IS NOT DISTINCT FROM $3::double precision
              AND sender_longitude IS NOT DISTINCT FROM $4::double precision
            RETURNING *
            "#,
        )
        .bind(inquiry.id)
        .bind(inquiry.location_id)
        .bind(inquiry.sender_latitude)
        .bind(inquiry.sender_longitude)
        .bind(inquiry.distance_km)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "save distance of"))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Inquiry>> {
        sqlx::query_as::<_, Inquiry>("SELECT * FROM inquiries WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch inquiry {}: {:?}", id, e);
                AppError::Database(e)
            })
    }

    async fn list(
        &self,
        location_id: Option<Uuid>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Inquiry>, i64)> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM inquiries WHERE ($1::uuid IS NULL OR location_id = $1)",
        )
        .bind(location_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count inquiries: {:?}", e);
            AppError::Database(e)
        })?;

        let items = sqlx::query_as::<_, Inquiry>(
            r#"
            SELECT * FROM inquiries
            WHERE ($1::uuid IS NULL OR location_id = $1)
            ORDER BY created_at DESC, id DESC
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(location_id)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list inquiries: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((items, total))
    }
}
