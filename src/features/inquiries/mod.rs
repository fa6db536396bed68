pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod workers;

pub use repositories::PgInquiryRepository;
pub use services::InquiryService;
pub use workers::{GeocodeDispatcher, GeocodeWorker};
