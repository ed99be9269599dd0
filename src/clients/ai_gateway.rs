//! Reqwest-backed timetable extractor for OpenAI-compatible gateways.
//!
//! Sends one chat-completions request with the uploaded file attached as
//! an image URL, then decodes the model's JSON answer. Status codes are
//! sorted into the coarse classes of [`ExtractionError`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};

use super::ai_prompt::{SYSTEM_PROMPT, build_user_prompt};
use super::body_preview;
use super::model_output::decode_timetable;
use crate::domain::ports::{ExtractionError, ExtractionRequest, TimetableExtractor};
use crate::domain::timetable::ExtractedTimetable;

/// Extractor that calls `{base}/chat/completions` on an OpenAI-compatible API.
pub struct AiGatewayExtractor {
    client: Client,
    endpoint: Url,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for AiGatewayExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiGatewayExtractor")
            .field("endpoint", &self.endpoint.as_str())
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl AiGatewayExtractor {
    /// Builds an extractor for the gateway rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::Upstream`] when `base_url` does not parse,
    /// or [`ExtractionError::Transport`] when the client cannot be built.
    pub fn new(
        base_url: &str,
        api_key: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, ExtractionError> {
        let mut endpoint = Url::parse(base_url).map_err(|e| ExtractionError::Upstream {
            message: format!("invalid ai gateway url {base_url}: {e}"),
        })?;
        endpoint
            .path_segments_mut()
            .map_err(|()| ExtractionError::Upstream {
                message: format!("ai gateway url {base_url} cannot be a base"),
            })?
            .pop_if_empty()
            .extend(["chat", "completions"]);

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(map_transport_error)?;
        Ok(Self {
            client,
            endpoint,
            api_key,
            model,
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    response_format: ResponseFormat,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

fn build_request<'a>(model: &'a str, request: &ExtractionRequest) -> ChatRequest<'a> {
    ChatRequest {
        model,
        temperature: 0.0,
        response_format: ResponseFormat {
            kind: "json_object",
        },
        messages: vec![
            ChatMessage {
                role: "system",
                content: MessageContent::Text(SYSTEM_PROMPT.to_string()),
            },
            ChatMessage {
                role: "user",
                content: MessageContent::Parts(vec![
                    ContentPart::Text {
                        text: build_user_prompt(request),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: request.file_url.clone(),
                        },
                    },
                ]),
            },
        ],
    }
}

#[async_trait]
impl TimetableExtractor for AiGatewayExtractor {
    async fn extract(
        &self,
        request: &ExtractionRequest,
    ) -> Result<ExtractedTimetable, ExtractionError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&build_request(&self.model, request))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_completion(body.as_ref())
    }
}

fn parse_completion(body: &[u8]) -> Result<ExtractedTimetable, ExtractionError> {
    let decoded: ChatResponse =
        serde_json::from_slice(body).map_err(|e| ExtractionError::Upstream {
            message: format!("invalid chat completion payload: {e}"),
        })?;
    let content = decoded
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| ExtractionError::Unparseable {
            message: "model returned no content".to_string(),
        })?;
    parse_model_json(&content)
}

/// Decodes the model's answer, tolerating code fences and chatter around
/// the JSON object.
fn parse_model_json(content: &str) -> Result<ExtractedTimetable, ExtractionError> {
    let object = content
        .find('{')
        .zip(content.rfind('}'))
        .and_then(|(start, end)| content.get(start..=end))
        .ok_or_else(|| ExtractionError::Unparseable {
            message: format!(
                "no JSON object in model output: {}",
                body_preview(content.as_bytes())
            ),
        })?;
    let value = serde_json::from_str(object).map_err(|e| ExtractionError::Unparseable {
        message: format!("model output is not valid JSON: {e}"),
    })?;
    decode_timetable(value)
}

fn map_transport_error(error: reqwest::Error) -> ExtractionError {
    ExtractionError::Transport {
        message: error.to_string(),
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ExtractionError {
    let message = format!("status {}: {}", status.as_u16(), body_preview(body));
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ExtractionError::Unauthorized { message }
        }
        StatusCode::PAYMENT_REQUIRED => ExtractionError::QuotaExhausted { message },
        StatusCode::TOO_MANY_REQUESTS => ExtractionError::RateLimited { message },
        _ => ExtractionError::Upstream { message },
    }
}
