//! Timetable service: AI extraction, review warnings, and persistence.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::ports::{ExtractionRequest, TimetableExtractor, TimetableRepository};
use crate::domain::timetable::{
    DailyTimes, ExtractedTimetable, MonthlyTimetable, SpecialDate, TimetableUpsert,
    merge_warnings, validate_month, validate_timetable,
};
use crate::error::ServiceError;

const PDF_MIME: &str = "application/pdf";

/// Coordinates timetable extraction and storage.
///
/// Neither path ever rejects a timetable for its content: the validator
/// output is returned as warnings for the admin to resolve.
#[derive(Clone)]
pub struct TimetableService {
    extractor: Arc<dyn TimetableExtractor>,
    timetables: Arc<dyn TimetableRepository>,
}

impl std::fmt::Debug for TimetableService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimetableService").finish_non_exhaustive()
    }
}

impl TimetableService {
    /// Creates a new `TimetableService`.
    #[must_use]
    pub fn new(
        extractor: Arc<dyn TimetableExtractor>,
        timetables: Arc<dyn TimetableRepository>,
    ) -> Self {
        Self {
            extractor,
            timetables,
        }
    }

    /// Reads one month of prayer times from an uploaded file.
    ///
    /// Validator warnings and a note about any stored timetable for the same
    /// month are appended to the model's own warnings.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidRequest`] for a blank URL or an
    /// unsupported file type, and the mapped extractor error when the
    /// gateway call fails.
    pub async fn extract(
        &self,
        mosque_id: Uuid,
        request: ExtractionRequest,
    ) -> Result<ExtractedTimetable, ServiceError> {
        if request.file_url.trim().is_empty() {
            return Err(ServiceError::InvalidRequest(
                "file_url is required".to_string(),
            ));
        }
        if !is_supported_file_type(&request.file_type) {
            return Err(ServiceError::InvalidRequest(format!(
                "file_type {} is not an image or PDF",
                request.file_type
            )));
        }

        let mut extracted = self.extractor.extract(&request).await?;

        let mut extra = validate_timetable(&extracted);
        extra.extend(self.reconcile(mosque_id, &extracted).await);
        extracted.warnings = merge_warnings(std::mem::take(&mut extracted.warnings), extra);

        tracing::info!(
            %mosque_id,
            month = extracted.month,
            year = extracted.year,
            days = extracted.monthly_times.len(),
            warnings = extracted.warnings.len(),
            "timetable extracted"
        );
        Ok(extracted)
    }

    /// Warning text when a timetable for the same month is already stored.
    ///
    /// Lookup failures are logged and produce no warning.
    async fn reconcile(&self, mosque_id: Uuid, extracted: &ExtractedTimetable) -> Option<String> {
        if !(1..=12).contains(&extracted.month) {
            return None;
        }
        match self
            .timetables
            .find(mosque_id, extracted.month, extracted.year)
            .await
        {
            Ok(Some(existing)) => Some(format!(
                "a timetable for {:02}/{} is already stored (last updated {}); saving will replace it",
                existing.month,
                existing.year,
                existing.updated_at.format("%Y-%m-%d %H:%M UTC"),
            )),
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(%mosque_id, error = %err, "stored timetable lookup failed");
                None
            }
        }
    }

    /// Returns the stored timetable for a month.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] when nothing is stored and
    /// [`ServiceError::PersistenceError`] when the lookup fails.
    pub async fn get(
        &self,
        mosque_id: Uuid,
        year: i32,
        month: u32,
    ) -> Result<MonthlyTimetable, ServiceError> {
        check_month(month)?;
        self.timetables
            .find(mosque_id, month, year)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "no timetable for mosque {mosque_id} in {month:02}/{year}"
                ))
            })
    }

    /// Stores a reviewed timetable, replacing any previous one for the month.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidRequest`] for a month outside 1 to 12
    /// and [`ServiceError::PersistenceError`] when the write fails.
    pub async fn save(
        &self,
        mosque_id: Uuid,
        year: i32,
        month: u32,
        monthly_times: Vec<DailyTimes>,
        special_dates: Vec<SpecialDate>,
    ) -> Result<(MonthlyTimetable, Vec<String>), ServiceError> {
        check_month(month)?;
        let warnings = validate_month(year, month, &monthly_times);

        let stored = self
            .timetables
            .upsert(&TimetableUpsert {
                mosque_id,
                month,
                year,
                monthly_times,
                special_dates,
            })
            .await?;

        tracing::info!(%mosque_id, month, year, warnings = warnings.len(), "timetable saved");
        Ok((stored, warnings))
    }
}

fn check_month(month: u32) -> Result<(), ServiceError> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(ServiceError::InvalidRequest(format!(
            "month must be between 1 and 12, got {month}"
        )))
    }
}

fn is_supported_file_type(file_type: &str) -> bool {
    let mime = file_type.trim().to_ascii_lowercase();
    mime == PDF_MIME || mime.strip_prefix("image/").is_some_and(|sub| !sub.is_empty())
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        ExtractionError, MockTimetableExtractor, MockTimetableRepository, RepositoryError,
    };
    use crate::domain::timetable::{ExtractionMode, Madhab, PrayerSlot};
    use crate::test_support::InMemoryTimetables;
    use rstest::rstest;

    fn request(file_type: &str) -> ExtractionRequest {
        ExtractionRequest {
            file_url: "https://files.example/timetable.png".to_string(),
            file_type: file_type.to_string(),
            mosque_name: "Masjid Umar".to_string(),
            madhab: Madhab::Hanafi,
            mode: ExtractionMode::Monthly,
        }
    }

    fn slot(adhan: &str) -> PrayerSlot {
        PrayerSlot {
            adhan: Some(adhan.to_string()),
            iqamah: None,
        }
    }

    fn day(day: u32, fajr: &str, dhuhr: &str) -> DailyTimes {
        DailyTimes {
            day,
            fajr: slot(fajr),
            dhuhr: slot(dhuhr),
            ..DailyTimes::default()
        }
    }

    fn extracted(warnings: &[&str]) -> ExtractedTimetable {
        ExtractedTimetable {
            month: 3,
            year: 2025,
            monthly_times: vec![day(1, "05:10", "12:20"), day(2, "13:00", "12:20")],
            special_dates: Vec::new(),
            warnings: warnings.iter().map(ToString::to_string).collect(),
        }
    }

    fn extractor_returning(t: ExtractedTimetable) -> MockTimetableExtractor {
        let mut mock = MockTimetableExtractor::new();
        mock.expect_extract().times(1).returning(move |_| Ok(t.clone()));
        mock
    }

    #[rstest]
    #[case("image/png", true)]
    #[case("IMAGE/JPEG", true)]
    #[case("application/pdf", true)]
    #[case("image/", false)]
    #[case("text/csv", false)]
    #[case("", false)]
    fn file_types(#[case] mime: &str, #[case] ok: bool) {
        assert_eq!(is_supported_file_type(mime), ok);
    }

    #[tokio::test]
    async fn rejects_unsupported_file_before_calling_model() {
        let mut extractor = MockTimetableExtractor::new();
        extractor.expect_extract().never();
        let svc = TimetableService::new(
            Arc::new(extractor),
            Arc::new(InMemoryTimetables::default()),
        );
        let result = svc.extract(Uuid::new_v4(), request("text/plain")).await;
        assert!(matches!(result, Err(ServiceError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn rejects_blank_url() {
        let mut extractor = MockTimetableExtractor::new();
        extractor.expect_extract().never();
        let svc = TimetableService::new(
            Arc::new(extractor),
            Arc::new(InMemoryTimetables::default()),
        );
        let mut req = request("image/png");
        req.file_url = "  ".to_string();
        assert!(matches!(
            svc.extract(Uuid::new_v4(), req).await,
            Err(ServiceError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn merges_model_and_validator_warnings() {
        let svc = TimetableService::new(
            Arc::new(extractor_returning(extracted(&["header was blurry"]))),
            Arc::new(InMemoryTimetables::default()),
        );
        let Ok(out) = svc.extract(Uuid::new_v4(), request("image/png")).await else {
            panic!("extraction should succeed");
        };
        assert_eq!(out.warnings[0], "header was blurry");
        assert_eq!(out.warnings.len(), 2);
        assert!(out.warnings[1].contains("day 2"));
        assert_eq!(out.monthly_times[1].fajr.adhan.as_deref(), Some("13:00"));
    }

    #[tokio::test]
    async fn warns_when_month_already_stored() {
        let mosque_id = Uuid::new_v4();
        let store = Arc::new(InMemoryTimetables::default());
        let Ok(_) = store
            .upsert(&TimetableUpsert {
                mosque_id,
                month: 3,
                year: 2025,
                monthly_times: Vec::new(),
                special_dates: Vec::new(),
            })
            .await
        else {
            panic!("seed should succeed");
        };

        let svc = TimetableService::new(Arc::new(extractor_returning(extracted(&[]))), store);
        let Ok(out) = svc.extract(mosque_id, request("application/pdf")).await else {
            panic!("extraction should succeed");
        };
        assert!(out.warnings.iter().any(|w| w.contains("already stored")));
    }

    #[tokio::test]
    async fn lookup_failure_does_not_block_extraction() {
        let mut repo = MockTimetableRepository::new();
        repo.expect_find().returning(|_, _, _| {
            Err(RepositoryError::Query {
                message: "timeout".to_string(),
            })
        });
        let svc = TimetableService::new(
            Arc::new(extractor_returning(extracted(&[]))),
            Arc::new(repo),
        );
        assert!(svc.extract(Uuid::new_v4(), request("image/png")).await.is_ok());
    }

    #[rstest]
    #[case(ExtractionError::Unauthorized { message: "bad key".into() }, 401)]
    #[case(ExtractionError::QuotaExhausted { message: "credits".into() }, 402)]
    #[case(ExtractionError::RateLimited { message: "slow down".into() }, 429)]
    #[case(ExtractionError::Unparseable { message: "prose".into() }, 422)]
    #[case(ExtractionError::Upstream { message: "500".into() }, 500)]
    #[tokio::test]
    async fn extractor_failures_map_to_status(#[case] err: ExtractionError, #[case] status: u16) {
        let mut extractor = MockTimetableExtractor::new();
        extractor.expect_extract().returning(move |_| Err(err.clone()));
        let svc = TimetableService::new(
            Arc::new(extractor),
            Arc::new(InMemoryTimetables::default()),
        );
        let Err(e) = svc.extract(Uuid::new_v4(), request("image/png")).await else {
            panic!("extraction should fail");
        };
        assert_eq!(e.status_code().as_u16(), status);
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let svc = TimetableService::new(
            Arc::new(MockTimetableExtractor::new()),
            Arc::new(InMemoryTimetables::default()),
        );
        assert!(matches!(
            svc.get(Uuid::new_v4(), 2025, 3).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn save_upserts_and_returns_warnings() {
        let mosque_id = Uuid::new_v4();
        let svc = TimetableService::new(
            Arc::new(MockTimetableExtractor::new()),
            Arc::new(InMemoryTimetables::default()),
        );

        let Ok((first, warnings)) = svc
            .save(mosque_id, 2025, 2, vec![day(30, "05:10", "12:20")], Vec::new())
            .await
        else {
            panic!("save should succeed");
        };
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("day 30"));

        let Ok((second, warnings)) = svc
            .save(mosque_id, 2025, 2, vec![day(1, "05:10", "12:20")], Vec::new())
            .await
        else {
            panic!("save should succeed");
        };
        assert!(warnings.is_empty());
        assert_eq!(first.id, second.id);

        let Ok(stored) = svc.get(mosque_id, 2025, 2).await else {
            panic!("stored timetable should be readable");
        };
        assert_eq!(stored.monthly_times[0].day, 1);
    }

    #[rstest]
    #[case(0)]
    #[case(13)]
    #[tokio::test]
    async fn save_rejects_bad_month(#[case] month: u32) {
        let mut repo = MockTimetableRepository::new();
        repo.expect_upsert().never();
        let svc = TimetableService::new(Arc::new(MockTimetableExtractor::new()), Arc::new(repo));
        assert!(matches!(
            svc.save(Uuid::new_v4(), 2025, month, Vec::new(), Vec::new()).await,
            Err(ServiceError::InvalidRequest(_))
        ));
    }
}
