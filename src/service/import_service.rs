//! CSV mosque import: dry-run validation and chunked live inserts.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::config::ImportSettings;
use crate::domain::csv_line::numbered_lines;
use crate::domain::mosque_record::{MosqueImportRecord, NewMosque, RowError, parse_mosque_line};
use crate::domain::ports::{Geocoder, MosqueRepository, RepositoryError};
use crate::domain::postcode::{BULK_LOOKUP_LIMIT, Coordinates, postcode_key};
use crate::domain::slug::{SlugAllocator, slugify};
use crate::error::ServiceError;

/// One call to the importer.
#[derive(Debug, Clone, Default)]
pub struct ImportRequest {
    /// Whole CSV file, header line included.
    pub csv_text: String,
    /// Parse and validate only.
    pub dry_run: bool,
    /// Index of the first data line to process (0 = first row after header).
    pub start_line: usize,
    /// Data lines to process in this call.
    pub max_lines: Option<usize>,
}

/// Result of a dry run over the whole file.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DryRunSummary {
    /// Data lines in the file (header and blank lines excluded).
    pub total_lines: usize,
    /// Lines that produced a record.
    pub parsed_count: usize,
    /// Lines that did not.
    pub error_count: usize,
    /// First parsed records.
    pub preview: Vec<MosqueImportRecord>,
    /// First row errors.
    pub errors: Vec<RowError>,
}

/// A record that parsed but was not inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct InsertFailure {
    /// 1-based line number in the uploaded file.
    pub line: usize,
    /// Mosque name.
    pub name: String,
    /// Failure reason.
    pub error: String,
}

/// Result of one live chunk.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LiveImportSummary {
    /// Data lines in the file.
    pub total_lines: usize,
    /// Rows written in this chunk.
    pub inserted_count: usize,
    /// Parsed rows not written in this chunk.
    pub insert_error_count: usize,
    /// Why each of those rows was not written.
    pub insert_errors: Vec<InsertFailure>,
    /// Lines in this chunk that did not parse.
    pub parse_error_count: usize,
    /// Their errors.
    pub parse_errors: Vec<RowError>,
    /// Whether lines remain after this chunk.
    pub has_more: bool,
    /// `startLine` for the next call.
    pub next_start_line: usize,
}

/// Outcome of [`ImportService::run`].
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum ImportOutcome {
    /// Nothing was written.
    DryRun(DryRunSummary),
    /// One chunk was written.
    Live(LiveImportSummary),
}

/// Converts CSV exports into mosque rows.
///
/// Each call is independent: persisted slugs are re-read per record, and
/// nothing carries over between chunks except what is in the database.
pub struct ImportService {
    geocoder: Arc<dyn Geocoder>,
    mosques: Arc<dyn MosqueRepository>,
    settings: ImportSettings,
}

impl std::fmt::Debug for ImportService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportService")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl ImportService {
    /// Creates a new `ImportService`.
    #[must_use]
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        mosques: Arc<dyn MosqueRepository>,
        settings: ImportSettings,
    ) -> Self {
        Self {
            geocoder,
            mosques,
            settings,
        }
    }

    /// Runs a dry run or one live chunk.
    ///
    /// Per-row problems are reported in the summary, never as errors.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidRequest`] when `csv_text` is blank.
    pub async fn run(&self, request: ImportRequest) -> Result<ImportOutcome, ServiceError> {
        if request.csv_text.trim().is_empty() {
            return Err(ServiceError::InvalidRequest(
                "csvText is required".to_string(),
            ));
        }

        // First non-blank line is the header.
        let lines: Vec<(usize, &str)> = numbered_lines(&request.csv_text).skip(1).collect();

        if request.dry_run {
            let summary = self.dry_run(&lines);
            tracing::info!(
                total = summary.total_lines,
                parsed = summary.parsed_count,
                errors = summary.error_count,
                "import dry run"
            );
            return Ok(ImportOutcome::DryRun(summary));
        }

        let summary = self
            .import_chunk(&lines, request.start_line, request.max_lines)
            .await;
        tracing::info!(
            start = request.start_line,
            inserted = summary.inserted_count,
            failed = summary.insert_error_count,
            parse_errors = summary.parse_error_count,
            has_more = summary.has_more,
            "import chunk done"
        );
        Ok(ImportOutcome::Live(summary))
    }

    fn dry_run(&self, lines: &[(usize, &str)]) -> DryRunSummary {
        let mut summary = DryRunSummary {
            total_lines: lines.len(),
            parsed_count: 0,
            error_count: 0,
            preview: Vec::new(),
            errors: Vec::new(),
        };

        for &(line_no, line) in lines {
            match parse_mosque_line(line_no, line, &self.settings.exclusion) {
                Ok(record) => {
                    summary.parsed_count += 1;
                    if summary.preview.len() < self.settings.preview_limit {
                        summary.preview.push(record);
                    }
                }
                Err(err) => {
                    summary.error_count += 1;
                    if summary.errors.len() < self.settings.error_sample_limit {
                        summary.errors.push(err);
                    }
                }
            }
        }
        summary
    }

    async fn import_chunk(
        &self,
        lines: &[(usize, &str)],
        start_line: usize,
        max_lines: Option<usize>,
    ) -> LiveImportSummary {
        let total = lines.len();
        let max_lines = max_lines
            .unwrap_or(self.settings.default_max_lines)
            .clamp(1, self.settings.max_lines_limit.max(1));
        let start = start_line.min(total);
        let end = start.saturating_add(max_lines).min(total);
        let window = lines.get(start..end).unwrap_or_default();

        let mut records = Vec::with_capacity(window.len());
        let mut parse_errors = Vec::new();
        for &(line_no, line) in window {
            match parse_mosque_line(line_no, line, &self.settings.exclusion) {
                Ok(record) => records.push(record),
                Err(err) => parse_errors.push(err),
            }
        }

        self.geocode_missing(&mut records).await;

        let mut inserted_count = 0;
        let mut insert_errors = Vec::new();
        let mut allocator = SlugAllocator::new();
        for record in records {
            match self.insert_record(record, &mut allocator).await {
                Ok(()) => inserted_count += 1,
                Err(failure) => insert_errors.push(failure),
            }
        }

        LiveImportSummary {
            total_lines: total,
            inserted_count,
            insert_error_count: insert_errors.len(),
            insert_errors,
            parse_error_count: parse_errors.len(),
            parse_errors,
            has_more: end < total,
            next_start_line: end,
        }
    }

    async fn insert_record(
        &self,
        record: MosqueImportRecord,
        allocator: &mut SlugAllocator,
    ) -> Result<(), InsertFailure> {
        let failure = |record: &MosqueImportRecord, error: String| InsertFailure {
            line: record.line,
            name: record.name.clone(),
            error,
        };

        let Some(coordinates) = record.coordinates() else {
            return Err(failure(
                &record,
                "no coordinates: postcode missing or could not be geocoded".to_string(),
            ));
        };

        let base = slugify(&record.name, record.postcode.as_deref());
        let existing = self
            .mosques
            .slugs_with_prefix(&base)
            .await
            .map_err(|e| failure(&record, format!("slug lookup failed: {e}")))?;
        allocator.extend(existing);
        let slug = allocator.allocate(&base);

        let mosque = NewMosque {
            slug,
            coordinates,
            record,
        };
        match self.mosques.insert_mosque(&mosque).await {
            Ok(id) => {
                tracing::debug!(
                    %id,
                    slug = %mosque.slug,
                    line = mosque.record.line,
                    "mosque inserted"
                );
                Ok(())
            }
            Err(err) => {
                if !matches!(err, RepositoryError::UniqueViolation { .. }) {
                    allocator.release(&mosque.slug);
                }
                tracing::error!(line = mosque.record.line, error = %err, "mosque insert failed");
                Err(failure(&mosque.record, err.to_string()))
            }
        }
    }

    /// Fills coordinates for records that have a postcode but no position.
    ///
    /// Batch failures are logged and skipped; affected records keep `None`.
    async fn geocode_missing(&self, records: &mut [MosqueImportRecord]) {
        let mut seen = HashSet::new();
        let wanted: Vec<String> = records
            .iter()
            .filter(|r| r.coordinates().is_none())
            .filter_map(|r| r.postcode.clone())
            .filter(|pc| seen.insert(postcode_key(pc)))
            .collect();
        if wanted.is_empty() {
            return;
        }

        let mut found: HashMap<String, Coordinates> = HashMap::new();
        for batch in wanted.chunks(BULK_LOOKUP_LIMIT) {
            match self.geocoder.bulk_lookup(batch).await {
                Ok(hits) => found.extend(hits),
                Err(err) => {
                    tracing::warn!(
                        batch = batch.len(),
                        error = %err,
                        "postcode batch not geocoded"
                    );
                }
            }
        }

        for record in records.iter_mut().filter(|r| r.coordinates().is_none()) {
            let hit = record
                .postcode
                .as_deref()
                .and_then(|pc| found.get(&postcode_key(pc)))
                .copied();
            if let Some(coordinates) = hit {
                record.set_coordinates(coordinates);
            }
        }
        tracing::debug!(requested = wanted.len(), resolved = found.len(), "geocoded postcodes");
    }
}
