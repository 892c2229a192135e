//! Model invocation: one completion request per import.
//!
//! A request is exactly one user-role message whose content parts are sent
//! in order: for text imports a single text part (prompt followed by the
//! recipe text), for PDF imports the document part followed by the prompt.
//!
//! Two backends implement [`ExtractionModel`]:
//!
//! * [`MessagesApiModel`] talks to the hosted Messages API directly and
//!   supports `document` parts natively. This is the default.
//! * [`ProviderModel`] adapts any `edgequake-llm` provider (OpenAI, Gemini,
//!   Ollama, ...). Documents are forwarded as a base64 attachment, which
//!   only providers that accept PDF attachments will read.
//!
//! There is no retry and no backoff. Imports are user-initiated and the user
//! can resubmit, so a failed call surfaces immediately.

use crate::config::ImportConfig;
use crate::error::RecipeError;
use crate::pipeline::encode::DocumentData;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// One content part of the user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    Document(DocumentData),
}

/// A single-message completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRequest {
    pub parts: Vec<ContentPart>,
}

impl ModelRequest {
    /// A request with one text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![ContentPart::Text(text.into())],
        }
    }

    /// A request with the document first and the instruction prompt second.
    pub fn document(document: DocumentData, prompt: impl Into<String>) -> Self {
        Self {
            parts: vec![ContentPart::Document(document), ContentPart::Text(prompt.into())],
        }
    }

    /// All text parts joined with blank lines.
    pub fn joined_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                ContentPart::Text(t) => Some(t.as_str()),
                ContentPart::Document(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// The first document part, if any.
    pub fn document_part(&self) -> Option<&DocumentData> {
        self.parts.iter().find_map(|p| match p {
            ContentPart::Document(d) => Some(d),
            ContentPart::Text(_) => None,
        })
    }
}

/// A hosted language model that turns a request into generated text.
#[async_trait]
pub trait ExtractionModel: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Run one completion. Returns the generated text, or an empty string if
    /// the model produced no text.
    async fn complete(&self, request: &ModelRequest) -> Result<String, RecipeError>;
}

// ── Hosted Messages API ──────────────────────────────────────────────────

/// Direct client for the hosted Messages API.
#[derive(Debug, Clone)]
pub struct MessagesApiModel {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    api_version: String,
    model: String,
    max_tokens: usize,
    temperature: Option<f32>,
}

impl MessagesApiModel {
    pub fn new(api_key: impl Into<String>, config: &ImportConfig) -> Result<Self, RecipeError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| RecipeError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    fn build_body(&self, request: &ModelRequest) -> MessagesRequest {
        let content = request
            .parts
            .iter()
            .map(|part| match part {
                ContentPart::Text(text) => RequestPart::Text { text: text.clone() },
                ContentPart::Document(doc) => RequestPart::Document {
                    source: DocumentSource {
                        kind: "base64",
                        media_type: doc.media_type.clone(),
                        data: doc.data.clone(),
                    },
                },
            })
            .collect();

        MessagesRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            messages: vec![RequestMessage {
                role: "user",
                content,
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    messages: Vec<RequestMessage>,
}

#[derive(Debug, Serialize)]
struct RequestMessage {
    role: &'static str,
    content: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RequestPart {
    Text { text: String },
    Document { source: DocumentSource },
}

#[derive(Debug, Serialize)]
struct DocumentSource {
    #[serde(rename = "type")]
    kind: &'static str,
    media_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Text of the first text-typed block, or empty.
fn first_text_block(blocks: Vec<ResponseBlock>) -> String {
    blocks
        .into_iter()
        .find_map(|b| match b {
            ResponseBlock::Text { text } => Some(text),
            ResponseBlock::Other => None,
        })
        .unwrap_or_default()
}

#[async_trait]
impl ExtractionModel for MessagesApiModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &ModelRequest) -> Result<String, RecipeError> {
        let start = Instant::now();
        let body = self.build_body(request);

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .json(&body)
            .send()
            .await
            .map_err(|e| RecipeError::ModelFailed {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&raw)
                .map(|env| env.error.message)
                .unwrap_or(raw);
            warn!("Model API returned {}: {}", status, message);
            return Err(RecipeError::ModelApi {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: MessagesResponse =
            response.json().await.map_err(|e| RecipeError::ModelFailed {
                message: format!("invalid response body: {e}"),
            })?;

        if let Some(ref usage) = parsed.usage {
            debug!(
                "{}: {} input tokens, {} output tokens, {:?}",
                self.model,
                usage.input_tokens,
                usage.output_tokens,
                start.elapsed()
            );
        }

        Ok(first_text_block(parsed.content))
    }
}

// ── edgequake-llm providers ──────────────────────────────────────────────

/// Adapter from an `edgequake-llm` provider to [`ExtractionModel`].
pub struct ProviderModel {
    provider: Arc<dyn LLMProvider>,
    label: String,
    max_tokens: usize,
    temperature: Option<f32>,
}

impl ProviderModel {
    pub fn new(provider: Arc<dyn LLMProvider>, label: impl Into<String>, config: &ImportConfig) -> Self {
        Self {
            provider,
            label: label.into(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    /// Build `CompletionOptions` from the import config.
    fn build_options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
            ..Default::default()
        }
    }
}

#[async_trait]
impl ExtractionModel for ProviderModel {
    fn name(&self) -> &str {
        &self.label
    }

    async fn complete(&self, request: &ModelRequest) -> Result<String, RecipeError> {
        let start = Instant::now();
        let text = request.joined_text();
        let message = match request.document_part() {
            Some(doc) => ChatMessage::user_with_images(
                text,
                vec![ImageData::new(doc.data.clone(), doc.media_type.clone())],
            ),
            None => ChatMessage::user(text),
        };

        let options = self.build_options();
        let response = self
            .provider
            .chat(&[message], Some(&options))
            .await
            .map_err(|e| RecipeError::ModelFailed {
                message: e.to_string(),
            })?;

        debug!(
            "{}: {} input tokens, {} output tokens, {:?}",
            self.label,
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );
        Ok(response.content)
    }
}
