use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::inquiries::dtos::{
    CreateInquiryDto, InquiryResponseDto, ListInquiriesQuery, UpdateInquiryDto,
};
use crate::features::inquiries::services::InquiryService;
use crate::shared::types::{ApiResponse, PaginationQuery};

/// Submit a contact inquiry
///
/// When both a location and the sender position are given, the distance
/// between them is stored with the inquiry. A location without coordinates is
/// geocoded first; a failed lookup leaves the distance empty.
#[utoipa::path(
    post,
    path = "/api/inquiries",
    request_body = CreateInquiryDto,
    responses(
        (status = 201, description = "Inquiry submitted", body = ApiResponse<InquiryResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Location not found")
    ),
    tag = "inquiries"
)]
pub async fn submit_inquiry(
    State(service): State<Arc<InquiryService>>,
    AppJson(dto): AppJson<CreateInquiryDto>,
) -> Result<(StatusCode, Json<ApiResponse<InquiryResponseDto>>)> {
    let inquiry = service.submit(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(inquiry.into()),
            Some("Thank you, we received your inquiry.".to_string()),
            None,
        )),
    ))
}

/// List inquiries, newest first (paginated)
#[utoipa::path(
    get,
    path = "/api/inquiries",
    params(ListInquiriesQuery, PaginationQuery),
    responses(
        (status = 200, description = "List of inquiries", body = ApiResponse<Vec<InquiryResponseDto>>),
    ),
    tag = "inquiries"
)]
pub async fn list_inquiries(
    State(service): State<Arc<InquiryService>>,
    Query(query): Query<ListInquiriesQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<InquiryResponseDto>>>> {
    let (inquiries, total) = service.list(query.location_id, &pagination).await?;
    Ok(Json(ApiResponse::page(
        inquiries.into_iter().map(Into::into).collect(),
        total,
        &pagination,
    )))
}

/// Get inquiry by ID
#[utoipa::path(
    get,
    path = "/api/inquiries/{id}",
    params(
        ("id" = Uuid, Path, description = "Inquiry ID")
    ),
    responses(
        (status = 200, description = "Inquiry found", body = ApiResponse<InquiryResponseDto>),
        (status = 404, description = "Inquiry not found")
    ),
    tag = "inquiries"
)]
pub async fn get_inquiry(
    State(service): State<Arc<InquiryService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<InquiryResponseDto>>> {
    let inquiry = service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(Some(inquiry.into()), None, None)))
}

/// Update the location or sender position of an inquiry
///
/// The stored distance is recomputed, or cleared when an input is missing.
#[utoipa::path(
    put,
    path = "/api/inquiries/{id}",
    params(
        ("id" = Uuid, Path, description = "Inquiry ID")
    ),
    request_body = UpdateInquiryDto,
    responses(
        (status = 200, description = "Inquiry updated", body = ApiResponse<InquiryResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Inquiry or location not found")
    ),
    tag = "inquiries"
)]
pub async fn update_inquiry(
    State(service): State<Arc<InquiryService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateInquiryDto>,
) -> Result<Json<ApiResponse<InquiryResponseDto>>> {
    let inquiry = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(inquiry.into()), None, None)))
}
