//! # recipebox
//!
//! A personal recipe catalog. Paste recipe text, a recipe page URL or a PDF,
//! and a language model extracts a structured recipe that is stored in
//! Postgres and served back over a small JSON API.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input
//!  │
//!  ├─ 1. Classify  PDF, URL or free text
//!  ├─ 2. Fetch     GET the page and strip markup (URL only)
//!  ├─ 3. Extract   one model call with the fixed extraction prompt
//!  ├─ 4. Parse     strip code fences, parse JSON, shape a recipe row
//!  └─ 5. Store     insert one row, return its id
//! ```
//!
//! Stored notes are rendered through a small line-oriented state machine
//! ([`notes`]) that recognises section headers and substitution lists.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use recipebox::{ImportConfig, ImportSource, Importer, MemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Model backend resolved from ANTHROPIC_API_KEY or another provider key
//!     let config = ImportConfig::default();
//!     let importer = Importer::from_config(config, Arc::new(MemoryStore::new()))?;
//!     let id = importer
//!         .import(&ImportSource::from_input("https://example.com/best-pancakes"))
//!         .await?;
//!     println!("{id}");
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `recipebox` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! recipebox = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod import;
pub mod notes;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod recipe;
pub mod render;
pub mod server;
pub mod store;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ImportConfig, ImportConfigBuilder};
pub use error::{RecipeError, EXTRACTION_FAILED_MESSAGE};
pub use import::{resolve_model, Extraction, Importer};
pub use notes::{parse_notes, render_notes, NoteBlock, Substitution};
pub use pipeline::input::{ImportRequest, ImportSource, InputKind};
pub use progress::{ImportProgressCallback, ImportStage, NoopProgressCallback, ProgressCallback};
pub use recipe::{Ingredient, NewRecipe, Recipe, RecipeId, RecipeSummary};
pub use store::{MemoryStore, PgRecipeStore, RecipeStore};
