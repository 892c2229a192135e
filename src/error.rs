//! Error types for the recipebox library.
//!
//! Every import, listing or detail request either succeeds or fails with a
//! single [`RecipeError`]. Nothing is retried and nothing is fatal to the
//! process: the error is scoped to the one request that produced it.
//!
//! The variants fall into three groups that callers treat differently:
//!
//! * **Caller mistakes** ([`RecipeError::InputMissing`], [`RecipeError::NotAPdf`]):
//!   the user must supply different input.
//! * **Extraction-format failures** ([`RecipeError::ExtractionParse`]): the
//!   model answered, but not with JSON. This is the one failure translated
//!   into domain guidance ([`EXTRACTION_FAILED_MESSAGE`]) rather than a raw
//!   error; see [`RecipeError::is_extraction_failure`].
//! * **Transport and storage failures** (everything else): the message is
//!   passed through as-is.

use thiserror::Error;

/// User-facing message for an extraction-format failure.
pub const EXTRACTION_FAILED_MESSAGE: &str =
    "Could not extract a recipe from that input. Try pasting the recipe text directly instead of a URL.";

/// All errors returned by the recipebox library.
#[derive(Debug, Error)]
pub enum RecipeError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Neither recipe text nor a PDF document was supplied.
    #[error("No input provided")]
    InputMissing,

    /// A file offered as a PDF does not start with the `%PDF` magic bytes.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: String, magic: Vec<u8> },

    // ── Fetch errors ──────────────────────────────────────────────────────
    /// The recipe URL was unreachable or answered with a non-success status.
    #[error("Failed to fetch URL '{url}': {reason}")]
    FetchFailed {
        url: String,
        status: Option<u16>,
        reason: String,
    },

    // ── Model errors ──────────────────────────────────────────────────────
    /// The configured model backend could not be built (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The model request never produced a response (network, TLS, decode).
    #[error("Model request failed: {message}")]
    ModelFailed { message: String },

    /// The model API answered with a non-success status.
    #[error("Model API error ({status}): {message}")]
    ModelApi { status: u16, message: String },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The model output was not valid JSON after fence stripping.
    #[error("Could not parse model output as JSON: {detail}")]
    ExtractionParse { detail: String },

    // ── Storage errors ────────────────────────────────────────────────────
    /// Insert or query failed, or the extracted object does not fit a recipe row.
    #[error("{message}")]
    Storage { message: String },

    /// No recipe exists with the requested id.
    #[error("Recipe '{id}' not found")]
    NotFound { id: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RecipeError {
    /// True when the model answered but its output could not be read as a recipe.
    ///
    /// Front ends report [`EXTRACTION_FAILED_MESSAGE`] for these instead of the
    /// raw error text.
    pub fn is_extraction_failure(&self) -> bool {
        matches!(self, RecipeError::ExtractionParse { .. })
    }

    /// Message suitable for showing to the person who started the request.
    pub fn user_message(&self) -> String {
        if self.is_extraction_failure() {
            EXTRACTION_FAILED_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }
}

impl From<sqlx::Error> for RecipeError {
    fn from(e: sqlx::Error) -> Self {
        RecipeError::Storage {
            message: e.to_string(),
        }
    }
}
