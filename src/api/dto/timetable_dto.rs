//! Timetable extraction and storage DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::timetable::{
    DailyTimes, ExtractedTimetable, ExtractionMode, Madhab, MonthlyTimetable, SpecialDate,
};

/// Request body for `POST /timetables/extract`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ExtractTimetableRequest {
    /// Public URL of the uploaded image or PDF.
    #[serde(default)]
    pub file_url: String,
    /// MIME type of the upload (`image/*` or `application/pdf`).
    #[serde(default)]
    pub file_type: String,
    /// Mosque the timetable belongs to.
    #[serde(default)]
    pub mosque_id: Option<Uuid>,
    /// Display name, passed to the model as context.
    #[serde(default)]
    pub mosque_name: String,
    /// Which Asr column to read when both are printed. Defaults to `shafi`.
    #[serde(default)]
    pub madhab_preference: Madhab,
    /// Prompt variant. Defaults to `monthly`.
    #[serde(default)]
    pub mode: ExtractionMode,
}

/// Response body for `POST /timetables/extract`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExtractTimetableResponse {
    /// Always `true`; failures use the error envelope.
    pub success: bool,
    /// The model's reading, with validator warnings merged in.
    pub extracted: ExtractedTimetable,
}

/// Request body for `PUT /mosques/{mosque_id}/timetables/{year}/{month}`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SaveTimetableRequest {
    /// Reviewed daily rows.
    #[serde(default)]
    pub monthly_times: Vec<DailyTimes>,
    /// Reviewed notable dates.
    #[serde(default)]
    pub special_dates: Vec<SpecialDate>,
}

/// Response body for a timetable save.
#[derive(Debug, Serialize, ToSchema)]
pub struct SaveTimetableResponse {
    /// The stored row.
    pub timetable: MonthlyTimetable,
    /// Validator warnings for the saved content.
    pub warnings: Vec<String>,
}
