//! CSV mosque import handler.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::ImportMosquesRequest;
use crate::app_state::AppState;
use crate::error::{ErrorResponse, ServiceError};
use crate::service::import_service::ImportOutcome;

/// `POST /import/mosques` — Dry-run or import one chunk of a CSV export.
///
/// # Errors
///
/// Returns [`ServiceError::InvalidRequest`] when `csvText` is blank. Row
/// level problems are reported in the body with a 200.
#[utoipa::path(
    post,
    path = "/api/v1/import/mosques",
    tag = "Import",
    summary = "Import mosques from CSV",
    description = "With `dryRun` the whole file is parsed and summarised without geocoding or writes. Otherwise data lines `[startLine, startLine + maxLines)` are geocoded where needed and inserted; call again with `nextStartLine` while `hasMore` is true.",
    request_body = ImportMosquesRequest,
    responses(
        (status = 200, description = "Dry-run summary or chunk result", body = ImportOutcome),
        (status = 400, description = "Missing CSV text", body = ErrorResponse),
    )
)]
pub async fn import_mosques(
    State(state): State<AppState>,
    Json(req): Json<ImportMosquesRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let outcome = state.import_service.run(req.into()).await?;
    Ok(Json(outcome))
}

/// Import routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/import/mosques", post(import_mosques))
}
