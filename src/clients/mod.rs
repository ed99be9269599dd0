//! Outbound HTTP adapters for third-party services.

pub mod ai_gateway;
pub mod ai_prompt;
mod model_output;
pub mod postcodes_io;

pub use ai_gateway::AiGatewayExtractor;
pub use postcodes_io::PostcodesIoGeocoder;

/// Single-line, length-capped rendering of an upstream error body.
pub(crate) fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
