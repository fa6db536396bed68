mod coordinates;
mod location;

pub use coordinates::Coordinates;
pub use location::{CoordinatesUpdate, CreateLocation, GeocodeStatus, Location, UpdateLocation};
