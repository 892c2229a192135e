//! Input classification: decide what the user handed us.
//!
//! An import request carries either free-form text (which may be a URL) or a
//! base64-encoded PDF. Classification is pure: no network access happens
//! here. Strings that merely look like URLs (missing scheme, `ftp://`, ...)
//! classify as text and are sent to the model as literal recipe content.

use crate::error::RecipeError;
use crate::pipeline::encode::DocumentData;
use serde::Deserialize;

/// What a free-form input string is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Url,
    Text,
}

/// Classify a free-form input string.
///
/// Returns [`InputKind::Url`] only if the trimmed string parses as an
/// absolute `http` or `https` URL.
pub fn classify(input: &str) -> InputKind {
    match reqwest::Url::parse(input.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => InputKind::Url,
        _ => InputKind::Text,
    }
}

/// Check if the input string is an absolute HTTP/HTTPS URL.
pub fn is_url(input: &str) -> bool {
    classify(input) == InputKind::Url
}

/// The body of an import request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportRequest {
    /// A URL or pasted recipe text.
    #[serde(default)]
    pub input: Option<String>,
    /// Base64-encoded PDF bytes.
    #[serde(default)]
    pub pdf: Option<String>,
}

/// A validated import source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportSource {
    /// A PDF document sent to the model as an attachment.
    Pdf(DocumentData),
    /// A web page to fetch; the string is the trimmed URL.
    Url(String),
    /// Literal recipe text; the string is trimmed.
    Text(String),
}

impl ImportSource {
    /// Build a source from a free-form string.
    pub fn from_input(input: &str) -> Self {
        let trimmed = input.trim().to_string();
        match classify(&trimmed) {
            InputKind::Url => ImportSource::Url(trimmed),
            InputKind::Text => ImportSource::Text(trimmed),
        }
    }

    /// `"pdf"`, `"url"` or `"text"`.
    pub fn kind(&self) -> &'static str {
        match self {
            ImportSource::Pdf(_) => "pdf",
            ImportSource::Url(_) => "url",
            ImportSource::Text(_) => "text",
        }
    }
}

impl ImportRequest {
    /// Validate the request. A PDF wins over text when both are present;
    /// absent and empty fields count as missing.
    pub fn into_source(self) -> Result<ImportSource, RecipeError> {
        if let Some(pdf) = self.pdf.filter(|p| !p.is_empty()) {
            return Ok(ImportSource::Pdf(DocumentData::pdf(pdf)));
        }
        match self.input.filter(|i| !i.is_empty()) {
            Some(input) => Ok(ImportSource::from_input(&input)),
            None => Err(RecipeError::InputMissing),
        }
    }
}

/// Keep at most `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/recipes/soup"));
        assert!(is_url("http://example.com"));
        assert!(is_url("  https://example.com/with-spaces  "));
        assert!(!is_url("example.com/recipes/soup"));
        assert!(!is_url("www.example.com"));
        assert!(!is_url("ftp://example.com/file"));
        assert!(!is_url("mailto:chef@example.com"));
        assert!(!is_url("2 cups flour, 1 egg"));
        assert!(!is_url(""));
    }

    #[test]
    fn request_without_fields_is_missing_input() {
        let err = ImportRequest::default().into_source().unwrap_err();
        assert!(matches!(err, RecipeError::InputMissing));

        let empty = ImportRequest {
            input: Some(String::new()),
            pdf: Some(String::new()),
        };
        assert!(matches!(empty.into_source(), Err(RecipeError::InputMissing)));
    }

    #[test]
    fn pdf_takes_precedence() {
        let req = ImportRequest {
            input: Some("https://example.com".into()),
            pdf: Some("JVBERi0=".into()),
        };
        let source = req.into_source().unwrap();
        assert_eq!(source.kind(), "pdf");
    }

    #[test]
    fn input_is_trimmed_and_classified() {
        let req = ImportRequest {
            input: Some("  https://example.com/soup \n".into()),
            pdf: None,
        };
        assert_eq!(
            req.into_source().unwrap(),
            ImportSource::Url("https://example.com/soup".into())
        );

        assert_eq!(
            ImportSource::from_input(" 2 cups flour "),
            ImportSource::Text("2 cups flour".into())
        );
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("crème brûlée", 4), "crèm");
        assert_eq!(truncate_chars("", 5), "");
    }

    #[test]
    fn request_deserializes_partial_bodies() {
        let req: ImportRequest = serde_json::from_str(r#"{"input":"soup"}"#).unwrap();
        assert_eq!(req.input.as_deref(), Some("soup"));
        assert!(req.pdf.is_none());
    }
}
