mod location_repository;
mod pg_location_repository;

pub use location_repository::{LocationRepository, SlugWrite};
pub use pg_location_repository::PgLocationRepository;
