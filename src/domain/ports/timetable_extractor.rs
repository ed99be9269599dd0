//! Driven port for the vision model that reads timetable images.

use async_trait::async_trait;

use crate::domain::timetable::{ExtractedTimetable, ExtractionMode, Madhab};

/// Everything the model needs to read one uploaded timetable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    /// Publicly reachable URL of the uploaded file.
    pub file_url: String,
    /// MIME type of the uploaded file.
    pub file_type: String,
    /// Display name of the mosque, used as prompt context.
    pub mosque_name: String,
    /// Which Asr column to prefer when both are printed.
    pub madhab: Madhab,
    /// Prompt variant.
    pub mode: ExtractionMode,
}

/// Errors surfaced by the AI gateway, already sorted into coarse classes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    /// The gateway rejected our credentials.
    #[error("ai gateway rejected credentials: {message}")]
    Unauthorized {
        /// Upstream detail.
        message: String,
    },
    /// The gateway throttled the request.
    #[error("ai gateway rate limited request: {message}")]
    RateLimited {
        /// Upstream detail.
        message: String,
    },
    /// The account behind the gateway has no credits left.
    #[error("ai gateway quota exhausted: {message}")]
    QuotaExhausted {
        /// Upstream detail.
        message: String,
    },
    /// The model answered, but not with a readable timetable.
    #[error("model output could not be parsed: {message}")]
    Unparseable {
        /// Parse failure detail.
        message: String,
    },
    /// Network transport failed before receiving a response.
    #[error("ai gateway transport failed: {message}")]
    Transport {
        /// Transport failure detail.
        message: String,
    },
    /// Any other non-success answer from the gateway.
    #[error("ai gateway failed: {message}")]
    Upstream {
        /// Upstream detail.
        message: String,
    },
}

/// Port for one-shot timetable extraction.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TimetableExtractor: Send + Sync {
    /// Reads one month of prayer times from the referenced file.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError`] classified by failure kind.
    async fn extract(
        &self,
        request: &ExtractionRequest,
    ) -> Result<ExtractedTimetable, ExtractionError>;
}
