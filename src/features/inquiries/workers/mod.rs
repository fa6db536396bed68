mod geocode_worker;

pub use geocode_worker::{GeocodeDispatcher, GeocodeJob, GeocodeWorker};
