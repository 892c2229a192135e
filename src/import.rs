//! Import entry points: raw input in, stored recipe id out.
//!
//! One import is one sequential pass:
//!
//! ```text
//! classify ─▶ fetch (URL only) ─▶ model ─▶ parse ─▶ insert
//! ```
//!
//! Nothing is shared between imports except the collaborators held by
//! [`Importer`], and nothing is retried. A failure at any stage ends the
//! import with that stage's [`RecipeError`].

use crate::config::ImportConfig;
use crate::error::RecipeError;
use crate::pipeline::fetch::{HttpFetcher, PageFetcher};
use crate::pipeline::input::{truncate_chars, ImportSource};
use crate::pipeline::llm::{ExtractionModel, MessagesApiModel, ModelRequest, ProviderModel};
use crate::pipeline::parse;
use crate::progress::ImportStage;
use crate::prompts::{text_extraction_prompt, EXTRACTION_PROMPT};
use crate::recipe::{NewRecipe, RecipeId};
use crate::store::RecipeStore;
use edgequake_llm::ProviderFactory;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// A parsed, not yet stored, recipe.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub recipe: NewRecipe,
    /// The JSON object exactly as the model returned it.
    pub raw: serde_json::Value,
}

/// Runs imports against one model, one fetcher and one store.
#[derive(Clone)]
pub struct Importer {
    model: Arc<dyn ExtractionModel>,
    fetcher: Arc<dyn PageFetcher>,
    store: Arc<dyn RecipeStore>,
    config: ImportConfig,
}

impl Importer {
    pub fn new(
        model: Arc<dyn ExtractionModel>,
        fetcher: Arc<dyn PageFetcher>,
        store: Arc<dyn RecipeStore>,
        config: ImportConfig,
    ) -> Self {
        Self {
            model,
            fetcher,
            store,
            config,
        }
    }

    /// Build an importer with the model resolved from `config` and an HTTP fetcher.
    pub fn from_config(config: ImportConfig, store: Arc<dyn RecipeStore>) -> Result<Self, RecipeError> {
        let model = resolve_model(&config)?;
        let fetcher = Arc::new(HttpFetcher::new(&config.user_agent)?);
        info!("Using model backend: {}", model.name());
        Ok(Self::new(model, fetcher, store, config))
    }

    pub fn store(&self) -> &Arc<dyn RecipeStore> {
        &self.store
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    fn stage(&self, stage: ImportStage) {
        debug!("Import stage: {}", stage.label());
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_stage(stage);
        }
    }

    /// Turn a source into a model request, fetching the page for URLs.
    ///
    /// Returns the request and the recipe's `source_url`.
    async fn prepare(&self, source: &ImportSource) -> Result<(ModelRequest, Option<String>), RecipeError> {
        match source {
            ImportSource::Pdf(document) => {
                debug!("PDF payload: ~{} bytes", document.decoded_len());
                Ok((ModelRequest::document(document.clone(), EXTRACTION_PROMPT), None))
            }
            ImportSource::Url(url) => {
                self.stage(ImportStage::Fetching);
                let text = self.fetcher.fetch_text(url).await?;
                let text = truncate_chars(&text, self.config.max_input_chars);
                Ok((ModelRequest::text(text_extraction_prompt(text)), Some(url.clone())))
            }
            ImportSource::Text(text) => {
                let text = truncate_chars(text, self.config.max_input_chars);
                Ok((ModelRequest::text(text_extraction_prompt(text)), None))
            }
        }
    }

    /// Run every stage except the insert.
    pub async fn extract(&self, source: &ImportSource) -> Result<Extraction, RecipeError> {
        let (request, source_url) = self.prepare(source).await?;

        self.stage(ImportStage::Extracting);
        let model_start = Instant::now();
        let raw = self.model.complete(&request).await?;
        info!(
            "Model {} answered with {} chars in {}ms",
            self.model.name(),
            raw.len(),
            model_start.elapsed().as_millis()
        );

        self.stage(ImportStage::Parsing);
        let value = parse::parse_model_output(&raw)?;
        let recipe = parse::recipe_from_value(value.clone(), source_url)?;

        Ok(Extraction { recipe, raw: value })
    }

    /// Import a recipe and return the stored id.
    pub async fn import(&self, source: &ImportSource) -> Result<RecipeId, RecipeError> {
        let start = Instant::now();
        info!("Starting {} import", source.kind());
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_import_start(source.kind());
        }

        let result = self.import_inner(source).await;

        match &result {
            Ok(id) => {
                info!("Imported recipe {} in {}ms", id, start.elapsed().as_millis());
                if let Some(ref cb) = self.config.progress_callback {
                    cb.on_import_complete(*id);
                }
            }
            Err(e) => {
                warn!("{} import failed: {}", source.kind(), e);
                if let Some(ref cb) = self.config.progress_callback {
                    cb.on_import_error(&e.to_string());
                }
            }
        }
        result
    }

    async fn import_inner(&self, source: &ImportSource) -> Result<RecipeId, RecipeError> {
        let extraction = self.extract(source).await?;
        self.stage(ImportStage::Saving);
        self.store.insert(&extraction.recipe).await
    }
}

// ── Model resolution ─────────────────────────────────────────────────────

/// Instantiate a named `edgequake-llm` provider with the given model.
fn create_provider_model(
    provider_name: &str,
    config: &ImportConfig,
) -> Result<Arc<dyn ExtractionModel>, RecipeError> {
    let provider = ProviderFactory::create_llm_provider(provider_name, &config.model).map_err(|e| {
        RecipeError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })?;
    let label = format!("{}/{}", provider_name, config.model);
    Ok(Arc::new(ProviderModel::new(provider, label, config)))
}

/// Resolve the extraction model, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`): used as-is.
/// 2. **Named provider** (`config.provider_name`): built by
///    [`ProviderFactory::create_llm_provider`] with `config.model`.
/// 3. **Hosted Messages API**: when `config.api_key` or `ANTHROPIC_API_KEY`
///    is set. The only backend that reads PDF attachments natively.
/// 4. **Auto-detection** ([`ProviderFactory::from_env`]): the first provider
///    whose API key is present in the environment.
///
/// Callers that already hold an [`ExtractionModel`] skip this and use
/// [`Importer::new`].
pub fn resolve_model(config: &ImportConfig) -> Result<Arc<dyn ExtractionModel>, RecipeError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::new(ProviderModel::new(
            Arc::clone(provider),
            config.model.clone(),
            config,
        )));
    }

    if let Some(ref name) = config.provider_name {
        return create_provider_model(name, config);
    }

    if let Some(key) = config.resolved_api_key() {
        return Ok(Arc::new(MessagesApiModel::new(key, config)?));
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| RecipeError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No model backend could be configured.\n\
                Set ANTHROPIC_API_KEY, or another provider key such as OPENAI_API_KEY.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(Arc::new(ProviderModel::new(llm_provider, "auto", config)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::encode::DocumentData;
    use crate::pipeline::llm::ContentPart;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const SOUP: &str = r#"{"name":"Soup","ingredients":[{"item":"water","quantity":"1","unit":"l"}],"instructions":["Boil."],"cook_time":null,"tags":["Easy"],"notes":null}"#;

    struct CannedModel {
        reply: String,
        seen: Mutex<Vec<ModelRequest>>,
    }

    impl CannedModel {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ExtractionModel for CannedModel {
        fn name(&self) -> &str {
            "canned"
        }

        async fn complete(&self, request: &ModelRequest) -> Result<String, RecipeError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(self.reply.clone())
        }
    }

    struct StaticFetcher(Result<String, u16>);

    #[async_trait]
    impl PageFetcher for StaticFetcher {
        async fn fetch_text(&self, url: &str) -> Result<String, RecipeError> {
            match &self.0 {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(RecipeError::FetchFailed {
                    url: url.to_string(),
                    status: Some(*status),
                    reason: format!("{status}"),
                }),
            }
        }
    }

    fn importer(
        model: Arc<CannedModel>,
        fetched: Result<String, u16>,
        config: ImportConfig,
    ) -> (Importer, MemoryStore) {
        let store = MemoryStore::new();
        let importer = Importer::new(
            model,
            Arc::new(StaticFetcher(fetched)),
            Arc::new(store.clone()),
            config,
        );
        (importer, store)
    }

    #[tokio::test]
    async fn text_import_stores_one_row() {
        let model = CannedModel::new(SOUP);
        let (importer, store) = importer(model.clone(), Ok(String::new()), ImportConfig::default());

        let id = importer
            .import(&ImportSource::Text("water, boil".into()))
            .await
            .unwrap();

        assert_eq!(store.len(), 1);
        let stored = store.get(id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Soup");
        assert_eq!(stored.tags, vec!["easy"]);
        assert_eq!(stored.source_url, None);

        let seen = model.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].joined_text().ends_with("Recipe text:\nwater, boil"));
    }

    #[tokio::test]
    async fn url_import_truncates_fetched_text_and_keeps_source() {
        let model = CannedModel::new(SOUP);
        let config = ImportConfig::builder().max_input_chars(5).build().unwrap();
        let (importer, store) = importer(model.clone(), Ok("abcdefghij".into()), config);

        let id = importer
            .import(&ImportSource::Url("https://example.com/soup".into()))
            .await
            .unwrap();

        let stored = store.get(id).await.unwrap().unwrap();
        assert_eq!(stored.source_url.as_deref(), Some("https://example.com/soup"));
        let seen = model.seen.lock().unwrap();
        assert!(seen[0].joined_text().ends_with("Recipe text:\nabcde"));
    }

    #[tokio::test]
    async fn failed_fetch_inserts_nothing() {
        let model = CannedModel::new(SOUP);
        let (importer, store) = importer(model.clone(), Err(404), ImportConfig::default());

        let err = importer
            .import(&ImportSource::Url("https://example.invalid/404".into()))
            .await
            .unwrap_err();

        assert!(matches!(err, RecipeError::FetchFailed { status: Some(404), .. }));
        assert!(store.is_empty());
        assert!(model.seen.lock().unwrap().is_empty(), "model must not be called");
    }

    #[tokio::test]
    async fn pdf_import_sends_document_then_prompt() {
        let model = CannedModel::new(&format!("```json\n{SOUP}\n```"));
        let (importer, store) = importer(model.clone(), Ok(String::new()), ImportConfig::default());

        importer
            .import(&ImportSource::Pdf(DocumentData::pdf("JVBERi0xLjQ=")))
            .await
            .unwrap();

        assert_eq!(store.len(), 1);
        let seen = model.seen.lock().unwrap();
        assert!(matches!(seen[0].parts[0], ContentPart::Document(_)));
        assert_eq!(seen[0].parts[1], ContentPart::Text(EXTRACTION_PROMPT.to_string()));
    }

    #[tokio::test]
    async fn unparseable_output_is_extraction_failure() {
        let model = CannedModel::new("Sorry, I can't help with that.");
        let (importer, store) = importer(model, Ok(String::new()), ImportConfig::default());

        let err = importer
            .import(&ImportSource::Text("hello".into()))
            .await
            .unwrap_err();
        assert!(err.is_extraction_failure());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn extract_does_not_store() {
        let model = CannedModel::new(SOUP);
        let (importer, store) = importer(model, Ok(String::new()), ImportConfig::default());

        let extraction = importer
            .extract(&ImportSource::Text("soup".into()))
            .await
            .unwrap();
        assert_eq!(extraction.recipe.name, "Soup");
        assert_eq!(extraction.raw["tags"][0], "Easy");
        assert!(store.is_empty());
    }

    #[test]
    fn explicit_api_key_resolves_messages_api() {
        let config = ImportConfig::builder()
            .api_key("sk-test")
            .model("claude-sonnet-4-6")
            .build()
            .unwrap();
        let model = resolve_model(&config).unwrap();
        assert_eq!(model.name(), "claude-sonnet-4-6");
    }
}
