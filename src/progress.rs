//! Progress-callback trait for import stage events.
//!
//! Inject an [`Arc<dyn ImportProgressCallback>`] via
//! [`crate::config::ImportConfigBuilder::progress_callback`] to be told when
//! each pipeline stage starts. The CLI uses it to drive a spinner; a server
//! could forward the events to a log or a socket. The trait is
//! `Send + Sync` because imports run on the tokio runtime.
//!
//! # Example
//!
//! ```rust
//! use recipebox::{ImportConfig, ImportProgressCallback, ImportStage};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl ImportProgressCallback for Printer {
//!     fn on_stage(&self, stage: ImportStage) {
//!         eprintln!("{}", stage.label());
//!     }
//! }
//!
//! let config = ImportConfig::builder()
//!     .progress_callback(Arc::new(Printer) as Arc<dyn ImportProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::recipe::RecipeId;
use std::fmt;
use std::sync::Arc;

/// The steps of one import, in order. `Fetching` only occurs for URL input
/// and `Saving` is skipped by dry runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStage {
    Fetching,
    Extracting,
    Parsing,
    Saving,
}

impl ImportStage {
    /// Short human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            ImportStage::Fetching => "Fetching page…",
            ImportStage::Extracting => "Extracting recipe…",
            ImportStage::Parsing => "Reading model output…",
            ImportStage::Saving => "Saving recipe…",
        }
    }
}

impl fmt::Display for ImportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Called by the import pipeline as it moves through its stages.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait ImportProgressCallback: Send + Sync {
    /// Called once before anything else.
    ///
    /// # Arguments
    /// * `kind`: `"pdf"`, `"url"` or `"text"`
    fn on_import_start(&self, kind: &str) {
        let _ = kind;
    }

    /// Called when a stage begins.
    fn on_stage(&self, stage: ImportStage) {
        let _ = stage;
    }

    /// Called after the recipe row was inserted.
    fn on_import_complete(&self, id: RecipeId) {
        let _ = id;
    }

    /// Called when the import fails.
    fn on_import_error(&self, error: &str) {
        let _ = error;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ImportProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ImportConfig`].
pub type ProgressCallback = Arc<dyn ImportProgressCallback>;
