use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::locations::dtos::{
    CreateLocationDto, GeocodeResponseDto, ListLocationsQuery, LocationResponseDto,
    UpdateLocationDto,
};
use crate::features::locations::services::LocationService;
use crate::shared::types::ApiResponse;

/// Create a location
///
/// The slug is derived from the name unless one is given, and gets a numeric
/// suffix when already taken.
#[utoipa::path(
    post,
    path = "/api/locations",
    request_body = CreateLocationDto,
    responses(
        (status = 201, description = "Location created", body = ApiResponse<LocationResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "No unique slug could be reserved")
    ),
    tag = "locations"
)]
pub async fn create_location(
    State(service): State<Arc<LocationService>>,
    AppJson(dto): AppJson<CreateLocationDto>,
) -> Result<(StatusCode, Json<ApiResponse<LocationResponseDto>>)> {
    let location = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(location.into()), None, None)),
    ))
}

/// List locations
#[utoipa::path(
    get,
    path = "/api/locations",
    params(ListLocationsQuery),
    responses(
        (status = 200, description = "List of locations", body = ApiResponse<Vec<LocationResponseDto>>),
    ),
    tag = "locations"
)]
pub async fn list_locations(
    State(service): State<Arc<LocationService>>,
    Query(query): Query<ListLocationsQuery>,
) -> Result<Json<ApiResponse<Vec<LocationResponseDto>>>> {
    let locations = service.list(query.active).await?;
    Ok(Json(ApiResponse::list(
        locations.into_iter().map(Into::into).collect(),
    )))
}

/// Get a location by ID or slug
#[utoipa::path(
    get,
    path = "/api/locations/{id}",
    params(
        ("id" = String, Path, description = "Location ID or slug")
    ),
    responses(
        (status = 200, description = "Location found", body = ApiResponse<LocationResponseDto>),
        (status = 404, description = "Location not found")
    ),
    tag = "locations"
)]
pub async fn get_location(
    State(service): State<Arc<LocationService>>,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<LocationResponseDto>>> {
    let location = service.get_by_key(&key).await?;
    Ok(Json(ApiResponse::success(Some(location.into()), None, None)))
}

/// Update a location
#[utoipa::path(
    put,
    path = "/api/locations/{id}",
    params(
        ("id" = Uuid, Path, description = "Location ID")
    ),
    request_body = UpdateLocationDto,
    responses(
        (status = 200, description = "Location updated", body = ApiResponse<LocationResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Location not found"),
        (status = 409, description = "No unique slug could be reserved")
    ),
    tag = "locations"
)]
pub async fn update_location(
    State(service): State<Arc<LocationService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateLocationDto>,
) -> Result<Json<ApiResponse<LocationResponseDto>>> {
    let location = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(location.into()), None, None)))
}

/// Delete a location
///
/// Inquiries referencing it are kept, with their location and distance cleared.
#[utoipa::path(
    delete,
    path = "/api/locations/{id}",
    params(
        ("id" = Uuid, Path, description = "Location ID")
    ),
    responses(
        (status = 204, description = "Location deleted"),
        (status = 404, description = "Location not found")
    ),
    tag = "locations"
)]
pub async fn delete_location(
    State(service): State<Arc<LocationService>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Geocode a location from its address
///
/// Existing coordinates are kept. A failed lookup is reported in the outcome,
/// not as an error.
#[utoipa::path(
    post,
    path = "/api/locations/{id}/geocode",
    params(
        ("id" = Uuid, Path, description = "Location ID")
    ),
    responses(
        (status = 200, description = "Geocoding attempted", body = ApiResponse<GeocodeResponseDto>),
        (status = 404, description = "Location not found")
    ),
    tag = "locations"
)]
pub async fn geocode_location(
    State(service): State<Arc<LocationService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<GeocodeResponseDto>>> {
    let (location, outcome) = service.geocode(id).await?;
    let response = GeocodeResponseDto {
        location: location.into(),
        outcome: outcome.into(),
    };
    Ok(Json(ApiResponse::success(Some(response), None, None)))
}
