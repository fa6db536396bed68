mod distance_service;
mod geocoding_service;
mod location_service;

pub use distance_service::DistanceService;
pub use geocoding_service::{
    GeocodeOutcome, GeocodingProvider, GeocodingService, NominatimClient, UnresolvedReason,
};
pub use location_service::LocationService;
