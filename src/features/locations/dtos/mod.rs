mod location_dto;

pub use location_dto::{
    CreateLocationDto, GeocodeOutcomeDto, GeocodeResponseDto, ListLocationsQuery,
    LocationResponseDto, UpdateLocationDto,
};
