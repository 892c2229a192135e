//! Document encoding: PDF bytes → base64 payload for the model request.
//!
//! The hosted model reads PDFs natively when they are attached as a base64
//! `document` content part, so no local rendering is needed. The HTTP import
//! endpoint receives the payload already encoded; the CLI reads a file and
//! encodes it here.

use crate::error::RecipeError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;
use tracing::debug;

/// Media type of PDF attachments.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// A base64-encoded document attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentData {
    pub media_type: String,
    /// Standard base64 of the raw bytes.
    pub data: String,
}

impl DocumentData {
    /// Wrap an already-encoded PDF payload.
    pub fn pdf(data: impl Into<String>) -> Self {
        Self {
            media_type: PDF_MEDIA_TYPE.to_string(),
            data: data.into(),
        }
    }

    /// Approximate decoded size in bytes.
    pub fn decoded_len(&self) -> usize {
        self.data.len() / 4 * 3
    }
}

/// Encode raw PDF bytes, checking the `%PDF` magic first.
pub fn encode_pdf(bytes: &[u8], origin: &str) -> Result<DocumentData, RecipeError> {
    if bytes.len() < 4 || &bytes[..4] != b"%PDF" {
        return Err(RecipeError::NotAPdf {
            path: origin.to_string(),
            magic: bytes.iter().take(4).copied().collect(),
        });
    }

    let b64 = STANDARD.encode(bytes);
    debug!("Encoded {} → {} bytes base64", origin, b64.len());
    Ok(DocumentData::pdf(b64))
}

/// Read a PDF from disk and encode it.
pub async fn load_pdf(path: impl AsRef<Path>) -> Result<DocumentData, RecipeError> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| RecipeError::Internal(format!("Failed to read '{}': {}", path.display(), e)))?;
    encode_pdf(&bytes, &path.display().to_string())
}
