//! In-memory storage and a scripted geocoder for service and handler tests

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::inquiries::models::{CreateInquiry, Inquiry};
use crate::features::inquiries::repositories::InquiryRepository;
use crate::features::locations::models::{
    Coordinates, CoordinatesUpdate, CreateLocation, GeocodeStatus, Location, UpdateLocation,
};
use crate::features::locations::repositories::{LocationRepository, SlugWrite};
use crate::features::locations::services::{
    GeocodeOutcome, GeocodingProvider, GeocodingService, LocationService, UnresolvedReason,
};

/// Build an unsaved location, optionally with coordinates
pub fn sample_location(name: &str, point: Option<(f64, f64)>) -> Location {
    let now = Utc::now();
    Location {
        id: Uuid::new_v4(),
        name: name.to_string(),
        slug: crate::shared::validation::slugify(name),
        address: format!("{} address", name),
        latitude: point.map(|p| p.0),
        longitude: point.map(|p| p.1),
        is_active: true,
        geocode_status: if point.is_some() {
            GeocodeStatus::Manual
        } else {
            GeocodeStatus::Pending
        },
        geocoded_at: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn location_service(
    store: Arc<InMemoryStore>,
    geocoder: Arc<StubGeocoder>,
) -> Arc<LocationService> {
    Arc::new(LocationService::new(
        store,
        Arc::new(GeocodingService::new(geocoder)),
    ))
}

/// Geocoding provider returning a fixed outcome and counting lookups
pub struct StubGeocoder {
    outcome: GeocodeOutcome,
    calls: AtomicUsize,
}

impl StubGeocoder {
    pub fn resolving(latitude: f64, longitude: f64) -> Self {
        Self {
            outcome: GeocodeOutcome::Resolved(Coordinates {
                latitude,
                longitude,
            }),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(reason: UnresolvedReason) -> Self {
        Self {
            outcome: GeocodeOutcome::Unresolved(reason),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeocodingProvider for StubGeocoder {
    async fn lookup(&self, _address: &str) -> GeocodeOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome
    }
}

/// Shared in-memory tables for locations and inquiries.
///
/// Mirrors the database constraints the services depend on: unique slugs,
/// coordinate writes that never overwrite existing coordinates, and inquiry
/// detachment on location delete.
#[derive(Default)]
pub struct InMemoryStore {
    locations: Mutex<Vec<Location>>,
    inquiries: Mutex<Vec<Inquiry>>,
    /// Slug availability checks always answer "free"
    stale_slug_reads: AtomicBool,
    /// Every slug write collides
    reject_all_slugs: AtomicBool,
    slug_write_attempts: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_stale_slug_reads(&self, value: bool) {
        self.stale_slug_reads.store(value, Ordering::SeqCst);
    }

    pub fn set_reject_all_slugs(&self, value: bool) {
        self.reject_all_slugs.store(value, Ordering::SeqCst);
    }

    pub fn slug_write_attempts(&self) -> usize {
        self.slug_write_attempts.load(Ordering::SeqCst)
    }

    fn slug_taken(&self, locations: &[Location], slug: &str, exclude: Option<Uuid>) -> bool {
        self.slug_write_attempts.fetch_add(1, Ordering::SeqCst);
        self.reject_all_slugs.load(Ordering::SeqCst)
            || locations
                .iter()
                .any(|l| l.slug == slug && Some(l.id) != exclude)
    }
}

#[async_trait]
impl LocationRepository for InMemoryStore {
    async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool> {
        if self.stale_slug_reads.load(Ordering::SeqCst) {
            return Ok(false);
        }
        let locations = self.locations.lock().unwrap();
        Ok(locations
            .iter()
            .any(|l| l.slug == slug && Some(l.id) != exclude))
    }

    async fn insert(&self, data: &CreateLocation) -> Result<SlugWrite<Location>> {
        let mut locations = self.locations.lock().unwrap();
        if self.slug_taken(&locations, &data.slug, None) {
            return Ok(SlugWrite::SlugTaken);
        }

        let now = Utc::now();
        let location = Location {
            id: Uuid::new_v4(),
            name: data.name.clone(),
            slug: data.slug.clone(),
            address: data.address.clone(),
            latitude: data.latitude,
            longitude: data.longitude,
            is_active: data.is_active,
            geocode_status: data.geocode_status,
            geocoded_at: None,
            created_at: now,
            updated_at: now,
        };
        locations.push(location.clone());
        Ok(SlugWrite::Written(location))
    }

    async fn update(&self, changes: &UpdateLocation) -> Result<SlugWrite<Location>> {
        let mut locations = self.locations.lock().unwrap();
        if let Some(slug) = &changes.slug {
            if self.slug_taken(&locations, slug, Some(changes.id)) {
                return Ok(SlugWrite::SlugTaken);
            }
        }

        let stored = locations
            .iter_mut()
            .find(|l| l.id == changes.id)
            .ok_or_else(|| AppError::NotFound(format!("Location '{}' not found", changes.id)))?;

        if let Some(name) = &changes.name {
            stored.name = name.clone();
        }
        if let Some(slug) = &changes.slug {
            stored.slug = slug.clone();
        }
        if let Some(address) = &changes.address {
            stored.address = address.clone();
        }
        if let Some(is_active) = changes.is_active {
            stored.is_active = is_active;
        }
        match changes.coordinates {
            Some(CoordinatesUpdate::Set(point)) => stored.set_manual_coordinates(point),
            Some(CoordinatesUpdate::Clear) => stored.clear_coordinates(),
            None => {}
        }
        stored.updated_at = Utc::now();
        Ok(SlugWrite::Written(stored.clone()))
    }

    async fn save_geocode(&self, location: &Location) -> Result<Location> {
        let mut locations = self.locations.lock().unwrap();
        let stored = locations
            .iter_mut()
            .find(|l| l.id == location.id)
            .ok_or_else(|| AppError::NotFound(format!("Location '{}' not found", location.id)))?;

        if stored.latitude.is_none() {
            stored.latitude = location.latitude;
            stored.longitude = location.longitude;
            stored.geocode_status = location.geocode_status;
            stored.geocoded_at = location.geocoded_at;
            stored.updated_at = Utc::now();
        }
        Ok(stored.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Location>> {
        let locations = self.locations.lock().unwrap();
        Ok(locations.iter().find(|l| l.id == id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Location>> {
        let locations = self.locations.lock().unwrap();
        Ok(locations.iter().find(|l| l.slug == slug).cloned())
    }

    async fn list(&self, active_only: bool) -> Result<Vec<Location>> {
        let locations = self.locations.lock().unwrap();
        let mut result: Vec<Location> = locations
            .iter()
            .filter(|l| !active_only || l.is_active)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.slug.cmp(&b.slug)));
        Ok(result)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut locations = self.locations.lock().unwrap();
        let mut inquiries = self.inquiries.lock().unwrap();

        let before = locations.len();
        locations.retain(|l| l.id != id);
        if locations.len() == before {
            return Ok(false);
        }

        for inquiry in inquiries.iter_mut().filter(|i| i.location_id == Some(id)) {
            inquiry.location_id = None;
            inquiry.distance_km = None;
            inquiry.updated_at = Utc::now();
        }
        Ok(true)
    }
}

#[async_trait]
impl InquiryRepository for InMemoryStore {
    async fn insert(&self, data: &CreateInquiry) -> Result<Inquiry> {
        let now = Utc::now();
        let inquiry = Inquiry {
            id: Uuid::new_v4(),
            name: data.name.clone(),
            email: data.email.clone(),
            phone: data.phone.clone(),
            company: data.company.clone(),
            message: data.message.clone(),
            location_id: data.location_id,
            sender_latitude: data.sender_latitude,
            sender_longitude: data.sender_longitude,
            distance_km: data.distance_km,
            created_at: now,
            updated_at: now,
        };
        self.inquiries.lock().unwrap().push(inquiry.clone());
        Ok(inquiry)
    }

    async fn update(&self, inquiry: &Inquiry) -> Result<Inquiry> {
        let mut inquiries = self.inquiries.lock().unwrap();
        let stored = inquiries
            .iter_mut()
            .find(|i| i.id == inquiry.id)
            .ok_or_else(|| AppError::NotFound(format!("Inquiry '{}' not found", inquiry.id)))?;

        stored.location_id = inquiry.location_id;
        stored.sender_latitude = inquiry.sender_latitude;
        stored.sender_longitude = inquiry.sender_longitude;
        stored.distance_km = inquiry.distance_km;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn save_distance(&self, inquiry: &Inquiry) -> Result<Option<Inquiry>> {
        let mut inquiries = self.inquiries.lock().unwrap();
        let Some(stored) = inquiries.iter_mut().find(|i| {
            i.id == inquiry.id
                && i.location_id == inquiry.location_id
                && i.sender_latitude == inquiry.sender_latitude
                && i.sender_longitude == inquiry.sender_longitude
        }) else {
            return Ok(None);
        };

        stored.distance_km = inquiry.distance_km;
        stored.updated_at = Utc::now();
        Ok(Some(stored.clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Inquiry>> {
        let inquiries = self.inquiries.lock().unwrap();
        Ok(inquiries.iter().find(|i| i.id == id).cloned())
    }

    async fn list(
        &self,
        location_id: Option<Uuid>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Inquiry>, i64)> {
        let inquiries = self.inquiries.lock().unwrap();
        // Insertion order stands in for created_at, newest first
        let matching: Vec<Inquiry> = inquiries
            .iter()
            .rev()
            .filter(|i| location_id.is_none() || i.location_id == location_id)
            .cloned()
            .collect();
        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }
}
