//! Timetable handlers: AI extraction, read, and save.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use uuid::Uuid;

use crate::api::dto::{
    ExtractTimetableRequest, ExtractTimetableResponse, SaveTimetableRequest,
    SaveTimetableResponse,
};
use crate::app_state::AppState;
use crate::domain::ports::ExtractionRequest;
use crate::domain::timetable::MonthlyTimetable;
use crate::error::{ErrorResponse, ServiceError};

/// `POST /timetables/extract` — Read a timetable image or PDF with the
/// vision model.
///
/// # Errors
///
/// Returns [`ServiceError::InvalidRequest`] for missing fields or an
/// unsupported file type, and the mapped upstream error when the model
/// call fails.
#[utoipa::path(
    post,
    path = "/api/v1/timetables/extract",
    tag = "Timetables",
    summary = "Extract a monthly timetable",
    description = "Sends the uploaded file to the AI gateway and returns the parsed month. The timetable is never rejected for its content; validator findings and a note about any stored timetable for the same month are returned in `extracted.warnings`.",
    request_body = ExtractTimetableRequest,
    responses(
        (status = 200, description = "Extracted timetable", body = ExtractTimetableResponse),
        (status = 400, description = "Missing field or unsupported file type", body = ErrorResponse),
        (status = 401, description = "AI gateway rejected credentials", body = ErrorResponse),
        (status = 402, description = "AI gateway quota exhausted", body = ErrorResponse),
        (status = 422, description = "Model output could not be parsed", body = ErrorResponse),
        (status = 429, description = "AI gateway rate limited", body = ErrorResponse),
        (status = 500, description = "AI gateway failure", body = ErrorResponse),
    )
)]
pub async fn extract_timetable(
    State(state): State<AppState>,
    Json(req): Json<ExtractTimetableRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let Some(mosque_id) = req.mosque_id else {
        return Err(ServiceError::InvalidRequest(
            "mosque_id is required".to_string(),
        ));
    };

    let extracted = state
        .timetable_service
        .extract(
            mosque_id,
            ExtractionRequest {
                file_url: req.file_url,
                file_type: req.file_type,
                mosque_name: req.mosque_name,
                madhab: req.madhab_preference,
                mode: req.mode,
            },
        )
        .await?;

    Ok(Json(ExtractTimetableResponse {
        success: true,
        extracted,
    }))
}

/// `GET /mosques/{mosque_id}/timetables/{year}/{month}` — Stored timetable.
///
/// # Errors
///
/// Returns [`ServiceError::NotFound`] when nothing is stored for the month.
#[utoipa::path(
    get,
    path = "/api/v1/mosques/{mosque_id}/timetables/{year}/{month}",
    tag = "Timetables",
    summary = "Get a stored timetable",
    params(
        ("mosque_id" = Uuid, Path, description = "Mosque UUID"),
        ("year" = i32, Path, description = "Gregorian year"),
        ("month" = u32, Path, description = "Month, 1 to 12"),
    ),
    responses(
        (status = 200, description = "Stored timetable", body = MonthlyTimetable),
        (status = 400, description = "Month out of range", body = ErrorResponse),
        (status = 404, description = "No timetable stored", body = ErrorResponse),
    )
)]
pub async fn get_timetable(
    State(state): State<AppState>,
    Path((mosque_id, year, month)): Path<(Uuid, i32, u32)>,
) -> Result<impl IntoResponse, ServiceError> {
    let timetable = state.timetable_service.get(mosque_id, year, month).await?;
    Ok(Json(timetable))
}

/// `PUT /mosques/{mosque_id}/timetables/{year}/{month}` — Save a reviewed
/// timetable.
///
/// # Errors
///
/// Returns [`ServiceError::InvalidRequest`] for a month outside 1 to 12.
#[utoipa::path(
    put,
    path = "/api/v1/mosques/{mosque_id}/timetables/{year}/{month}",
    tag = "Timetables",
    summary = "Save a reviewed timetable",
    description = "Replaces any stored timetable for the month. Validator findings are returned as warnings and never block the save.",
    params(
        ("mosque_id" = Uuid, Path, description = "Mosque UUID"),
        ("year" = i32, Path, description = "Gregorian year"),
        ("month" = u32, Path, description = "Month, 1 to 12"),
    ),
    request_body = SaveTimetableRequest,
    responses(
        (status = 200, description = "Stored timetable and warnings", body = SaveTimetableResponse),
        (status = 400, description = "Month out of range", body = ErrorResponse),
    )
)]
pub async fn save_timetable(
    State(state): State<AppState>,
    Path((mosque_id, year, month)): Path<(Uuid, i32, u32)>,
    Json(req): Json<SaveTimetableRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let (timetable, warnings) = state
        .timetable_service
        .save(mosque_id, year, month, req.monthly_times, req.special_dates)
        .await?;
    Ok(Json(SaveTimetableResponse {
        timetable,
        warnings,
    }))
}

/// Timetable routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/timetables/extract", post(extract_timetable))
        .route(
            "/mosques/{mosque_id}/timetables/{year}/{month}",
            get(get_timetable).put(save_timetable),
        )
}
