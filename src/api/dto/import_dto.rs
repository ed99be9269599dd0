//! CSV import DTOs.

use serde::Deserialize;
use utoipa::ToSchema;

use crate::service::ImportRequest;

/// Request body for `POST /import/mosques`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportMosquesRequest {
    /// Full CSV export, header line included.
    #[serde(default)]
    pub csv_text: Option<String>,
    /// Validate only; nothing is geocoded or written.
    #[serde(default)]
    pub dry_run: bool,
    /// First data line to process (0 = the row after the header).
    #[serde(default)]
    pub start_line: usize,
    /// Data lines to process in this call. Server default when omitted.
    #[serde(default)]
    pub max_lines: Option<usize>,
}

impl From<ImportMosquesRequest> for ImportRequest {
    fn from(req: ImportMosquesRequest) -> Self {
        Self {
            csv_text: req.csv_text.unwrap_or_default(),
            dry_run: req.dry_run,
            start_line: req.start_line,
            max_lines: req.max_lines,
        }
    }
}
