//! OpenAPI documentation for the REST API.
//!
//! Served by Swagger UI at `/docs` when the `swagger-ui` feature is on.

use utoipa::OpenApi;

use crate::api::dto::{
    ExtractTimetableRequest, ExtractTimetableResponse, GeocodeRequest, GeocodeResponse,
    GeocodeResult, ImportMosquesRequest, SaveTimetableRequest, SaveTimetableResponse,
};
use crate::api::handlers::system::HealthResponse;
use crate::domain::mosque_record::{
    MosqueImportRecord, ParkingType, RowError, RowErrorKind, TarawihStyle, UsageType,
};
use crate::domain::postcode::Coordinates;
use crate::domain::timetable::{
    DailyTimes, ExtractedTimetable, ExtractionMode, Madhab, MonthlyTimetable, PrayerSlot,
    SpecialDate,
};
use crate::error::{ErrorBody, ErrorResponse};
use crate::service::import_service::{
    DryRunSummary, ImportOutcome, InsertFailure, LiveImportSummary,
};

/// OpenAPI document for the REST API.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "Minaarly back-office API",
        description = "CSV mosque import, postcode geocoding and AI prayer-timetable extraction for the Minaarly admin UI.",
        license(name = "MIT")
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::api::handlers::system::health_handler,
        crate::api::handlers::import::import_mosques,
        crate::api::handlers::timetable::extract_timetable,
        crate::api::handlers::timetable::get_timetable,
        crate::api::handlers::timetable::save_timetable,
        crate::api::handlers::geocode::geocode,
    ),
    components(schemas(
        ErrorResponse,
        ErrorBody,
        HealthResponse,
        ImportMosquesRequest,
        ImportOutcome,
        DryRunSummary,
        LiveImportSummary,
        InsertFailure,
        MosqueImportRecord,
        UsageType,
        ParkingType,
        TarawihStyle,
        RowError,
        RowErrorKind,
        ExtractTimetableRequest,
        ExtractTimetableResponse,
        SaveTimetableRequest,
        SaveTimetableResponse,
        ExtractedTimetable,
        MonthlyTimetable,
        DailyTimes,
        PrayerSlot,
        SpecialDate,
        Madhab,
        ExtractionMode,
        GeocodeRequest,
        GeocodeResponse,
        GeocodeResult,
        Coordinates,
    )),
    tags(
        (name = "System", description = "Health probes"),
        (name = "Import", description = "CSV mosque import"),
        (name = "Timetables", description = "AI timetable extraction and storage"),
        (name = "Geocoding", description = "UK postcode lookups"),
    )
)]
pub struct ApiDoc;
