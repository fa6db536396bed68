use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::locations::dtos::{CreateLocationDto, UpdateLocationDto};
use crate::features::locations::models::{
    Coordinates, CoordinatesUpdate, CreateLocation, GeocodeStatus, Location, UpdateLocation,
};
use crate::features::locations::repositories::{LocationRepository, SlugWrite};
use crate::shared::constants::{
    FALLBACK_SLUG, MAX_LOCATION_FIELD_LEN, MAX_SLUG_PROBES, MAX_SLUG_WRITE_CONFLICTS,
};
use crate::shared::validation::{
    slugify, validate_coordinate_pair, validate_not_blank, SLUG_REGEX,
};

use super::{GeocodeOutcome, GeocodingService};

/// Room kept at the end of a base slug for a "-N" suffix
const SLUG_SUFFIX_RESERVE: usize = 11;

/// A slug-carrying write waiting for a free slug
enum PendingWrite {
    Insert(CreateLocation),
    Update(UpdateLocation),
}

impl PendingWrite {
    fn set_slug(&mut self, slug: String) {
        match self {
            PendingWrite::Insert(data) => data.slug = slug,
            PendingWrite::Update(changes) => changes.slug = Some(slug),
        }
    }

    fn exclude(&self) -> Option<Uuid> {
        match self {
            PendingWrite::Insert(_) => None,
            PendingWrite::Update(changes) => Some(changes.id),
        }
    }
}

/// Suffix `n` applied to `base`: base, base-1, base-2, ...
fn slug_candidate(base: &str, n: u32) -> String {
    if n == 0 {
        base.to_string()
    } else {
        format!("{}-{}", base, n)
    }
}

/// Normalize a requested slug or derive one from the name
fn base_slug(requested: Option<&str>, name: &str) -> Result<String> {
    let slug = match requested {
        Some(requested) => {
            let slug = slugify(requested);
            if slug.is_empty() {
                return Err(AppError::Validation(
                    "Slug must contain at least one letter or digit".to_string(),
                ));
            }
            slug
        }
        None => {
            let slug = slugify(name);
            if slug.is_empty() {
                FALLBACK_SLUG.to_string()
            } else {
                slug
            }
        }
    };

    let max_len = MAX_LOCATION_FIELD_LEN - SLUG_SUFFIX_RESERVE;
    if slug.len() <= max_len {
        return Ok(slug);
    }
    // slugify output is ASCII, byte slicing is safe
    Ok(slug[..max_len].trim_end_matches('-').to_string())
}

/// Office location management
pub struct LocationService {
    repo: Arc<dyn LocationRepository>,
    geocoder: Arc<GeocodingService>,
}

impl LocationService {
    pub fn new(repo: Arc<dyn LocationRepository>, geocoder: Arc<GeocodingService>) -> Self {
        Self { repo, geocoder }
    }

    pub async fn create(&self, dto: CreateLocationDto) -> Result<Location> {
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        validate_coordinate_pair(dto.latitude, dto.longitude).map_err(AppError::Validation)?;
        validate_not_blank("name", &dto.name).map_err(AppError::Validation)?;
        validate_not_blank("address", &dto.address).map_err(AppError::Validation)?;

        let base = base_slug(dto.slug.as_deref(), &dto.name)?;
        let geocode_status = if dto.latitude.is_some() {
            GeocodeStatus::Manual
        } else {
            GeocodeStatus::Pending
        };

        let data = CreateLocation {
            name: dto.name.trim().to_string(),
            slug: base.clone(),
            address: dto.address.trim().to_string(),
            latitude: dto.latitude,
            longitude: dto.longitude,
            is_active: dto.is_active.unwrap_or(true),
            geocode_status,
        };

        let location = self
            .write_with_unique_slug(&base, PendingWrite::Insert(data))
            .await?;

        tracing::info!(
            "Location created: id={}, slug={}, geocode_status={}",
            location.id,
            location.slug,
            location.geocode_status
        );

        Ok(location)
    }

    pub async fn list(&self, active_only: bool) -> Result<Vec<Location>> {
        self.repo.list(active_only).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Location> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Location '{}' not found", id)))
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Location> {
        self.repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Location '{}' not found", slug)))
    }

    /// Look up by UUID when the key parses as one, by slug otherwise
    pub async fn get_by_key(&self, key: &str) -> Result<Location> {
        if let Ok(id) = Uuid::parse_str(key) {
            return self.get_by_id(id).await;
        }
        if !SLUG_REGEX.is_match(key) {
            return Err(AppError::NotFound(format!("Location '{}' not found", key)));
        }
        self.get_by_slug(key).await
    }

    /// Apply a partial update.
    ///
    /// Only the fields present in `dto` are written, so a concurrent geocode of
    /// the same row survives an unrelated edit. The slug only changes when a new
    /// one is requested; renaming keeps the existing slug. An address change
    /// keeps stored coordinates unless `clear_coordinates` is set.
    pub async fn update(&self, id: Uuid, dto: UpdateLocationDto) -> Result<Location> {
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        validate_coordinate_pair(dto.latitude, dto.longitude).map_err(AppError::Validation)?;
        if let Some(name) = &dto.name {
            validate_not_blank("name", name).map_err(AppError::Validation)?;
        }
        if let Some(address) = &dto.address {
            validate_not_blank("address", address).map_err(AppError::Validation)?;
        }
        if dto.clear_coordinates && dto.latitude.is_some() {
            return Err(AppError::Validation(
                "Cannot set and clear coordinates in the same request".to_string(),
            ));
        }

        let coordinates = if dto.clear_coordinates {
            Some(CoordinatesUpdate::Clear)
        } else {
            Coordinates::from_pair(dto.latitude, dto.longitude).map(CoordinatesUpdate::Set)
        };

        let changes = UpdateLocation {
            id,
            name: dto.name.as_deref().map(|name| name.trim().to_string()),
            slug: None,
            address: dto.address.as_deref().map(|address| address.trim().to_string()),
            is_active: dto.is_active,
            coordinates,
        };

        let location = match dto.slug.as_deref() {
            Some(requested) => {
                let base = base_slug(Some(requested), "")?;
                self.write_with_unique_slug(&base, PendingWrite::Update(changes))
                    .await?
            }
            None => match self.repo.update(&changes).await? {
                SlugWrite::Written(location) => location,
                SlugWrite::SlugTaken => {
                    return Err(AppError::Conflict(format!(
                        "Location '{}' changed concurrently, please retry",
                        id
                    )))
                }
            },
        };

        tracing::info!(
            "Location updated: id={}, slug={}",
            location.id,
            location.slug
        );

        Ok(location)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if !self.repo.delete(id).await? {
            return Err(AppError::NotFound(format!("Location '{}' not found", id)));
        }
        tracing::info!("Location deleted: id={}", id);
        Ok(())
    }

    /// Explicitly geocode a stored location and persist the result
    pub async fn geocode(&self, id: Uuid) -> Result<(Location, GeocodeOutcome)> {
        let location = self.get_by_id(id).await?;
        self.ensure_coordinates(location).await
    }

    /// Make sure the location has coordinates, geocoding at most once.
    ///
    /// Locations that already have coordinates are returned as-is without a
    /// provider call or a write. Geocoding failures are reported in the
    /// outcome, only storage failures are errors.
    pub async fn ensure_coordinates(
        &self,
        mut location: Location,
    ) -> Result<(Location, GeocodeOutcome)> {
        if let Some(point) = location.coordinates() {
            return Ok((location, GeocodeOutcome::Resolved(point)));
        }

        let outcome = self.geocoder.geocode_location(&mut location).await;
        let stored = self.repo.save_geocode(&location).await?;

        // A concurrent writer may have set coordinates first
        let outcome = match stored.coordinates() {
            Some(point) => GeocodeOutcome::Resolved(point),
            None => outcome,
        };

        Ok((stored, outcome))
    }

    /// Find the first free candidate at or after suffix `start`
    async fn next_free_slug(
        &self,
        base: &str,
        exclude: Option<Uuid>,
        start: u32,
    ) -> Result<(String, u32)> {
        for n in start..start.saturating_add(MAX_SLUG_PROBES) {
            let candidate = slug_candidate(base, n);
            if !self.repo.slug_exists(&candidate, exclude).await? {
                return Ok((candidate, n));
            }
        }
        Err(AppError::Conflict(format!(
            "No free slug found for '{}'",
            base
        )))
    }

    /// Pick a free slug and write, moving past candidates lost to concurrent writers
    async fn write_with_unique_slug(
        &self,
        base: &str,
        mut pending: PendingWrite,
    ) -> Result<Location> {
        let exclude = pending.exclude();
        let mut start = 0;

        for attempt in 1..=MAX_SLUG_WRITE_CONFLICTS {
            let (slug, n) = self.next_free_slug(base, exclude, start).await?;
            pending.set_slug(slug.clone());

            let written = match &pending {
                PendingWrite::Insert(data) => self.repo.insert(data).await?,
                PendingWrite::Update(changes) => self.repo.update(changes).await?,
            };

            match written {
                SlugWrite::Written(location) => return Ok(location),
                SlugWrite::SlugTaken => {
                    tracing::warn!(
                        "Slug '{}' was taken concurrently (attempt {}/{})",
                        slug,
                        attempt,
                        MAX_SLUG_WRITE_CONFLICTS
                    );
                    start = n + 1;
                }
            }
        }

        Err(AppError::Conflict(format!(
            "Could not reserve a unique slug for '{}', please retry",
            base
        )))
    }
}
