use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::inquiries::dtos::{CreateInquiryDto, UpdateInquiryDto};
use crate::features::inquiries::models::{CreateInquiry, Inquiry};
use crate::features::inquiries::repositories::InquiryRepository;
use crate::features::inquiries::workers::{GeocodeDispatcher, GeocodeJob};
use crate::features::locations::models::{Coordinates, Location};
use crate::features::locations::services::{DistanceService, LocationService};
use crate::shared::types::PaginationQuery;
use crate::shared::validation::validate_coordinate_pair;

/// Distance to store with an inquiry
#[derive(Debug, PartialEq)]
enum DistanceResolution {
    Ready(Option<f64>),
    /// The location needs geocoding first, the worker fills the distance in later
    Deferred(Uuid),
}

/// Contact inquiries and their distance to the addressed office
pub struct InquiryService {
    repo: Arc<dyn InquiryRepository>,
    location_service: Arc<LocationService>,
    /// Present when geocoding runs in the background worker
    dispatcher: Option<GeocodeDispatcher>,
}

impl InquiryService {
    pub fn new(
        repo: Arc<dyn InquiryRepository>,
        location_service: Arc<LocationService>,
        dispatcher: Option<GeocodeDispatcher>,
    ) -> Self {
        Self {
            repo,
            location_service,
            dispatcher,
        }
    }

    pub async fn submit(&self, dto: CreateInquiryDto) -> Result<Inquiry> {
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        validate_coordinate_pair(dto.sender_latitude, dto.sender_longitude)
            .map_err(AppError::Validation)?;

        let location = match dto.location_id {
            Some(id) => Some(self.location_service.get_by_id(id).await?),
            None => None,
        };
        let sender = Coordinates::from_pair(dto.sender_latitude, dto.sender_longitude);
        let resolution = self.resolve_distance(location, sender).await?;

        let data = CreateInquiry {
            name: dto.name.trim().to_string(),
            email: dto.email.trim().to_string(),
            phone: dto.phone,
            company: dto.company,
            message: dto.message,
            location_id: dto.location_id,
            sender_latitude: dto.sender_latitude,
            sender_longitude: dto.sender_longitude,
            distance_km: match resolution {
                DistanceResolution::Ready(distance) => distance,
                DistanceResolution::Deferred(_) => None,
            },
        };

        let inquiry = self.repo.insert(&data).await?;

        tracing::info!(
            "Inquiry submitted: id={}, location={:?}, distance_km={:?}",
            inquiry.id,
            inquiry.location_id,
            inquiry.distance_km
        );

        self.dispatch_if_deferred(&resolution, inquiry.id);

        Ok(inquiry)
    }

    /// Change the location reference or sender position and recompute the distance
    pub async fn update(&self, id: Uuid, dto: UpdateInquiryDto) -> Result<Inquiry> {
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        validate_coordinate_pair(dto.sender_latitude, dto.sender_longitude)
            .map_err(AppError::Validation)?;
        if dto.clear_location && dto.location_id.is_some() {
            return Err(AppError::Validation(
                "Cannot set and clear the location in the same request".to_string(),
            ));
        }
        if dto.clear_sender_coordinates && dto.sender_latitude.is_some() {
            return Err(AppError::Validation(
                "Cannot set and clear sender coordinates in the same request".to_string(),
            ));
        }

        let mut inquiry = self.get_by_id(id).await?;

        if dto.clear_location {
            inquiry.location_id = None;
        } else if let Some(location_id) = dto.location_id {
            inquiry.location_id = Some(location_id);
        }
        if dto.clear_sender_coordinates {
            inquiry.sender_latitude = None;
            inquiry.sender_longitude = None;
        } else if dto.sender_latitude.is_some() {
            inquiry.sender_latitude = dto.sender_latitude;
            inquiry.sender_longitude = dto.sender_longitude;
        }

        let location = match inquiry.location_id {
            Some(location_id) => Some(self.location_service.get_by_id(location_id).await?),
            None => None,
        };
        let resolution = self
            .resolve_distance(location, inquiry.sender_coordinates())
            .await?;
        inquiry.distance_km = match resolution {
            DistanceResolution::Ready(distance) => distance,
            DistanceResolution::Deferred(_) => None,
        };

        let inquiry = self.repo.update(&inquiry).await?;
        self.dispatch_if_deferred(&resolution, inquiry.id);

        Ok(inquiry)
    }

    /// Refresh the distance from the current stored coordinates. Never geocodes.
    ///
    /// Writes `distance_km` only. When the location or sender position changed
    /// since the read, that edit already stored its own distance and the row is
    /// returned as it is.
    pub async fn recompute_distance(&self, id: Uuid) -> Result<Inquiry> {
        let mut inquiry = self.get_by_id(id).await?;

        let location = match inquiry.location_id {
            Some(location_id) => match self.location_service.get_by_id(location_id).await {
                Ok(location) => Some(location),
                Err(AppError::NotFound(_)) => None,
                Err(e) => return Err(e),
            },
            None => None,
        };

        let sender = inquiry.sender_coordinates();
        inquiry.distance_km =
            location.and_then(|location| DistanceService::distance_km(&location, sender));

        match self.repo.save_distance(&inquiry).await? {
            Some(saved) => Ok(saved),
            None => {
                tracing::debug!(
                    "Inquiry {} changed while its distance was recomputed, keeping the newer row",
                    id
                );
                self.get_by_id(id).await
            }
        }
    }

    /// One page of inquiries, newest first, with the total match count
    pub async fn list(
        &self,
        location_id: Option<Uuid>,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<Inquiry>, i64)> {
        self.repo
            .list(location_id, pagination.offset(), pagination.limit())
            .await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Inquiry> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Inquiry '{}' not found", id)))
    }

    /// Decide the distance for a save.
    ///
    /// Without both inputs there is no distance. A location lacking
    /// coordinates is geocoded inline, or handed to the worker in deferred mode.
    async fn resolve_distance(
        &self,
        location: Option<Location>,
        sender: Option<Coordinates>,
    ) -> Result<DistanceResolution> {
        let (Some(location), Some(sender)) = (location, sender) else {
            return Ok(DistanceResolution::Ready(None));
        };

        if location.has_coordinates() {
            return Ok(DistanceResolution::Ready(DistanceService::distance_km(
                &location,
                Some(sender),
            )));
        }

        if self.dispatcher.is_some() {
            return Ok(DistanceResolution::Deferred(location.id));
        }

        let (location, _) = self.location_service.ensure_coordinates(location).await?;
        Ok(DistanceResolution::Ready(DistanceService::distance_km(
            &location,
            Some(sender),
        )))
    }

    fn dispatch_if_deferred(&self, resolution: &DistanceResolution, inquiry_id: Uuid) {
        if let (DistanceResolution::Deferred(location_id), Some(dispatcher)) =
            (resolution, &self.dispatcher)
        {
            dispatcher.dispatch(GeocodeJob {
                location_id: *location_id,
                inquiry_id,
            });
        }
    }
}
