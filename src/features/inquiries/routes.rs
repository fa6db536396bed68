use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::inquiries::handlers;
use crate::features::inquiries::services::InquiryService;

/// Create routes for the inquiries feature
pub fn routes(service: Arc<InquiryService>) -> Router {
    Router::new()
        .route(
            "/api/inquiries",
            get(handlers::list_inquiries).post(handlers::submit_inquiry),
        )
        .route(
            "/api/inquiries/{id}",
            get(handlers::get_inquiry).put(handlers::update_inquiry),
        )
        .with_state(service)
}
