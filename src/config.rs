//! Configuration for the import pipeline.
//!
//! All import behaviour is controlled through [`ImportConfig`], built via its
//! [`ImportConfigBuilder`]. Callers set only what they care about and rely
//! on the defaults for the rest.

use crate::error::RecipeError;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::sync::Arc;

/// Default hosted model identifier.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-6";

/// Default base URL of the hosted Messages API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.anthropic.com";

/// Messages API version header value.
pub const DEFAULT_API_VERSION: &str = "2023-06-01";

/// Largest accepted `POST /api/import` body: 32 MiB, the hosted Messages
/// API request ceiling. A base64 PDF grows by a third over its file size.
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 32 * 1024 * 1024;

/// Client identifier sent when fetching recipe pages.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; recipe-importer/1.0)";

/// Configuration for a recipe import.
///
/// # Example
/// ```rust
/// use recipebox::ImportConfig;
///
/// let config = ImportConfig::builder()
///     .model("claude-sonnet-4-6")
///     .max_input_chars(8_000)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_input_chars, 8_000);
/// ```
#[derive(Clone)]
pub struct ImportConfig {
    /// Model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Output-token budget for the single extraction call. Default: 8096.
    ///
    /// A long recipe with every notes section filled in runs to a few
    /// thousand tokens of JSON; running out mid-object produces invalid JSON
    /// and therefore an extraction failure.
    pub max_tokens: usize,

    /// Sampling temperature. Default: `None` (provider default).
    pub temperature: Option<f32>,

    /// Prefix length, in characters, of the text sent to the model. Default: 12 000.
    ///
    /// Applied after markup stripping. Bounds prompt size and cost for long
    /// pages whose recipe is usually near the top anyway.
    pub max_input_chars: usize,

    /// `User-Agent` sent when fetching a recipe URL.
    pub user_agent: String,

    /// Body size limit of the HTTP import route. Default: [`DEFAULT_MAX_REQUEST_BYTES`].
    pub max_request_bytes: usize,

    /// API key for the hosted Messages API. Falls back to `ANTHROPIC_API_KEY`.
    pub api_key: Option<String>,

    /// Base URL of the hosted Messages API. Default: [`DEFAULT_API_BASE_URL`].
    pub api_base_url: String,

    /// Messages API version header. Default: [`DEFAULT_API_VERSION`].
    pub api_version: String,

    /// Named `edgequake-llm` provider (e.g. "openai", "ollama").
    /// Takes precedence over the hosted Messages API.
    pub provider_name: Option<String>,

    /// Pre-constructed `edgequake-llm` provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Optional stage events for progress display.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 8096,
            temperature: None,
            max_input_chars: 12_000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
            api_key: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            provider_name: None,
            provider: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ImportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportConfig")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("max_input_chars", &self.max_input_chars)
            .field("user_agent", &self.user_agent)
            .field("max_request_bytes", &self.max_request_bytes)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("api_version", &self.api_version)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ImportProgressCallback>"),
            )
            .finish()
    }
}

impl ImportConfig {
    /// Create a new builder for `ImportConfig`.
    pub fn builder() -> ImportConfigBuilder {
        ImportConfigBuilder {
            config: Self::default(),
        }
    }

    /// The configured API key, or `ANTHROPIC_API_KEY` from the environment.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
            .filter(|k| !k.is_empty())
    }
}

/// Builder for [`ImportConfig`].
#[derive(Debug)]
pub struct ImportConfigBuilder {
    config: ImportConfig,
}

impl ImportConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = Some(t.clamp(0.0, 1.0));
        self
    }

    pub fn max_input_chars(mut self, n: usize) -> Self {
        self.config.max_input_chars = n;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    pub fn max_request_bytes(mut self, n: usize) -> Self {
        self.config.max_request_bytes = n;
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = url.into();
        self
    }

    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.config.api_version = version.into();
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ImportConfig, RecipeError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(RecipeError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.max_input_chars == 0 {
            return Err(RecipeError::InvalidConfig(
                "max_input_chars must be ≥ 1".into(),
            ));
        }
        if c.max_request_bytes == 0 {
            return Err(RecipeError::InvalidConfig(
                "max_request_bytes must be ≥ 1".into(),
            ));
        }
        if c.model.trim().is_empty() {
            return Err(RecipeError::InvalidConfig("model must not be empty".into()));
        }
        Ok(self.config)
    }
}
