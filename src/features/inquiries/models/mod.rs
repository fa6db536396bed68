mod inquiry;

pub use inquiry::{CreateInquiry, Inquiry};
