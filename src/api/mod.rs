//! REST API layer: route handlers, DTOs, and router composition.
//!
//! All endpoints are mounted under `/api/v1`; `/health` stays at the root.

pub mod doc;
pub mod dto;
pub mod handlers;

use axum::Router;

use crate::app_state::AppState;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::config::ImportSettings;
    use crate::domain::ports::{
        ExtractionError, GeocodeError, Geocoder, MockGeocoder, MockTimetableExtractor,
    };
    use crate::domain::timetable::ExtractedTimetable;
    use crate::service::{ImportService, TimetableService};
    use crate::test_support::{FixedGeocoder, InMemoryMosques, InMemoryTimetables};

    fn state_with(
        geocoder: Arc<dyn Geocoder>,
        extractor: MockTimetableExtractor,
    ) -> AppState {
        AppState {
            import_service: Arc::new(ImportService::new(
                Arc::clone(&geocoder),
                Arc::new(InMemoryMosques::default()),
                ImportSettings::default(),
            )),
            timetable_service: Arc::new(TimetableService::new(
                Arc::new(extractor),
                Arc::new(InMemoryTimetables::default()),
            )),
            geocoder,
        }
    }

    fn default_state() -> AppState {
        state_with(
            Arc::new(FixedGeocoder::new(&[("LS3 1DT", 53.8066, -1.5654)])),
            MockTimetableExtractor::new(),
        )
    }

    async fn send(
        state: AppState,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let app = build_router().with_state(state);
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        };
        let Ok(request) = request else {
            panic!("request should build");
        };
        let response = app
            .oneshot(request)
            .await
            .unwrap_or_else(|never| match never {});
        let status = response.status();
        let Ok(bytes) = to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body should be readable");
        };
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (status, body) = send(default_state(), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn import_without_csv_is_bad_request() {
        let (status, body) = send(
            default_state(),
            Method::POST,
            "/api/v1/import/mosques",
            Some(json!({ "dryRun": true })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], 1001);
    }

    #[tokio::test]
    async fn import_with_null_csv_uses_error_envelope() {
        let (status, body) = send(
            default_state(),
            Method::POST,
            "/api/v1/import/mosques",
            Some(json!({ "csvText": null, "dryRun": true })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], 1001);
    }

    #[tokio::test]
    async fn import_dry_run_reports_counts() {
        let csv = "name,address,city,postcode\n\
                   Leeds Grand Mosque,9 Woodsley Rd,Leeds,LS3 1DT\n\
                   ,no name,Leeds,LS1 1AA";
        let (status, body) = send(
            default_state(),
            Method::POST,
            "/api/v1/import/mosques",
            Some(json!({ "csvText": csv, "dryRun": true })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalLines"], 2);
        assert_eq!(body["parsedCount"], 1);
        assert_eq!(body["errorCount"], 1);
        assert_eq!(body["preview"][0]["postcode"], "LS3 1DT");
    }

    #[tokio::test]
    async fn import_live_chunk_geocodes_and_inserts() {
        let csv = "name,address,city,postcode\nLeeds Grand Mosque,9 Woodsley Rd,Leeds,ls3 1dt";
        let (status, body) = send(
            default_state(),
            Method::POST,
            "/api/v1/import/mosques",
            Some(json!({ "csvText": csv, "startLine": 0, "maxLines": 10 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["insertedCount"], 1);
        assert_eq!(body["hasMore"], false);
        assert_eq!(body["nextStartLine"], 1);
    }

    #[tokio::test]
    async fn extract_requires_mosque_id() {
        let (status, _) = send(
            default_state(),
            Method::POST,
            "/api/v1/timetables/extract",
            Some(json!({ "file_url": "https://x/t.png", "file_type": "image/png" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn extract_returns_success_envelope() {
        let mut extractor = MockTimetableExtractor::new();
        extractor.expect_extract().returning(|req| {
            assert_eq!(req.madhab, crate::domain::timetable::Madhab::Hanafi);
            Ok(ExtractedTimetable {
                month: 4,
                year: 2025,
                monthly_times: Vec::new(),
                special_dates: Vec::new(),
                warnings: Vec::new(),
            })
        });
        let state = state_with(Arc::new(FixedGeocoder::default()), extractor);
        let (status, body) = send(
            state,
            Method::POST,
            "/api/v1/timetables/extract",
            Some(json!({
                "file_url": "https://files.example/april.pdf",
                "file_type": "application/pdf",
                "mosque_id": "6f1c2a7e-8d5b-4c1e-9f0a-3b2d4e5f6a7b",
                "mosque_name": "Masjid Umar",
                "madhab_preference": "hanafi",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["extracted"]["month"], 4);
    }

    #[tokio::test]
    async fn extract_quota_exhausted_is_payment_required() {
        let mut extractor = MockTimetableExtractor::new();
        extractor.expect_extract().returning(|_| {
            Err(ExtractionError::QuotaExhausted {
                message: "no credits".to_string(),
            })
        });
        let state = state_with(Arc::new(FixedGeocoder::default()), extractor);
        let (status, body) = send(
            state,
            Method::POST,
            "/api/v1/timetables/extract",
            Some(json!({
                "file_url": "https://files.example/april.png",
                "file_type": "image/png",
                "mosque_id": "6f1c2a7e-8d5b-4c1e-9f0a-3b2d4e5f6a7b",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(body["error"]["code"], 5002);
    }

    #[tokio::test]
    async fn timetable_save_then_get() {
        let state = default_state();
        let uri = "/api/v1/mosques/6f1c2a7e-8d5b-4c1e-9f0a-3b2d4e5f6a7b/timetables/2025/4";

        let (status, _) = send(state.clone(), Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(
            state.clone(),
            Method::PUT,
            uri,
            Some(json!({
                "monthly_times": [
                    { "day": 1, "fajr": { "adhan": "04:50", "iqamah": "05:15" } },
                    { "day": 2, "fajr": { "adhan": "4:49" } }
                ]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["warnings"].as_array().map(Vec::len), Some(1));

        let (status, body) = send(state, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["monthly_times"][0]["fajr"]["iqamah"], "05:15");
    }

    #[tokio::test]
    async fn geocode_single_normalises_postcode() {
        let (status, body) = send(
            default_state(),
            Method::POST,
            "/api/v1/geocode",
            Some(json!({ "action": "single", "postcode": " ls3   1dt " })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["postcode"], "LS3 1DT");
        assert_eq!(body["coordinates"]["latitude"], 53.8066);
    }

    #[tokio::test]
    async fn geocode_bulk_keeps_request_order() {
        let (status, body) = send(
            default_state(),
            Method::POST,
            "/api/v1/geocode",
            Some(json!({ "action": "bulk", "postcodes": ["ZZ9 9ZZ", "ls31dt"] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"][0]["coordinates"], Value::Null);
        assert_eq!(body["results"][1]["coordinates"]["longitude"], -1.5654);
    }

    #[tokio::test]
    async fn geocode_bulk_over_limit_is_bad_request() {
        let postcodes: Vec<String> = (0..101).map(|i| format!("M{i} 1AA")).collect();
        let (status, _) = send(
            default_state(),
            Method::POST,
            "/api/v1/geocode",
            Some(json!({ "action": "bulk", "postcodes": postcodes })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn geocode_upstream_failure_is_bad_gateway() {
        let mut geocoder = MockGeocoder::new();
        geocoder.expect_lookup().returning(|_| {
            Err(GeocodeError::Transport {
                message: "connection refused".to_string(),
            })
        });
        let state = state_with(Arc::new(geocoder), MockTimetableExtractor::new());
        let (status, _) = send(
            state,
            Method::POST,
            "/api/v1/geocode",
            Some(json!({ "action": "single", "postcode": "LS3 1DT" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }
}
