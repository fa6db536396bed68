mod inquiry_repository;
mod pg_inquiry_repository;

pub use inquiry_repository::InquiryRepository;
pub use pg_inquiry_repository::PgInquiryRepository;
