use utoipa::{Modify, OpenApi};

use crate::core::config::SwaggerConfig;
use crate::features::inquiries::{dtos as inquiries_dtos, handlers as inquiries_handlers};
use crate::features::locations::{
    dtos as locations_dtos, handlers as locations_handlers, models as locations_models,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Locations
        locations_handlers::create_location,
        locations_handlers::list_locations,
        locations_handlers::get_location,
        locations_handlers::update_location,
        locations_handlers::delete_location,
        locations_handlers::geocode_location,
        // Inquiries
        inquiries_handlers::submit_inquiry,
        inquiries_handlers::list_inquiries,
        inquiries_handlers::get_inquiry,
        inquiries_handlers::update_inquiry,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Locations
            locations_models::GeocodeStatus,
            locations_dtos::CreateLocationDto,
            locations_dtos::UpdateLocationDto,
            locations_dtos::GeocodeOutcomeDto,
            ApiResponse<locations_dtos::LocationResponseDto>,
            ApiResponse<Vec<locations_dtos::LocationResponseDto>>,
            ApiResponse<locations_dtos::GeocodeResponseDto>,
            // Inquiries
            inquiries_dtos::CreateInquiryDto,
            inquiries_dtos::UpdateInquiryDto,
            ApiResponse<inquiries_dtos::InquiryResponseDto>,
            ApiResponse<Vec<inquiries_dtos::InquiryResponseDto>>,
        )
    ),
    tags(
        (name = "locations", description = "Office locations and geocoding"),
        (name = "inquiries", description = "Contact inquiries with distance to the chosen office"),
    ),
    info(
        title = "Office Locator API",
        version = "0.1.0",
        description = "API documentation for Office Locator",
    )
)]
pub struct ApiDoc;

/// Overrides the document info with values from configuration
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl From<&SwaggerConfig> for SwaggerInfoModifier {
    fn from(config: &SwaggerConfig) -> Self {
        Self {
            title: config.title.clone(),
            version: config.version.clone(),
            description: config.description.clone(),
        }
    }
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
