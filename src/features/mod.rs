pub mod inquiries;
pub mod locations;
