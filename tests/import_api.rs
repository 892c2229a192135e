//! HTTP-level tests for the recipe API.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot`. The
//! model and page fetcher are stubs and storage is a `MemoryStore`, so no
//! network or database is needed.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use recipebox::pipeline::fetch::PageFetcher;
use recipebox::pipeline::llm::{ExtractionModel, ModelRequest};
use recipebox::server::{create_router, AppState};
use recipebox::{ImportConfig, Importer, MemoryStore, RecipeError, EXTRACTION_FAILED_MESSAGE};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

// ── Test doubles ─────────────────────────────────────────────────────────────

const PANCAKES: &str = r#"{
  "name": "Pancakes",
  "ingredients": [
    {"item": "flour", "quantity": "2", "unit": "cups"},
    {"item": "milk", "quantity": "1 1/2", "unit": "cups", "note": "warm"}
  ],
  "instructions": ["Whisk everything.", "Fry in butter."],
  "cook_time": "20 minutes • serves 4",
  "tags": ["Breakfast", "quick"],
  "notes": "Cooking for kids:\nAdd chocolate chips.\n\nSubstitutions: milk: oat milk | butter: oil"
}"#;

/// Replies with a fixed string and counts calls.
struct StubModel {
    reply: String,
    calls: AtomicUsize,
}

#[async_trait]
impl ExtractionModel for StubModel {
    fn name(&self) -> &str {
        "stub"
    }

    async fn complete(&self, _request: &ModelRequest) -> Result<String, RecipeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

/// Serves canned pages; any other URL answers 404.
#[derive(Default)]
struct StubFetcher {
    pages: HashMap<String, String>,
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, RecipeError> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| RecipeError::FetchFailed {
                url: url.to_string(),
                status: Some(404),
                reason: "404 Not Found".to_string(),
            })
    }
}

struct Harness {
    app: Router,
    store: MemoryStore,
    model: Arc<StubModel>,
}

fn harness(reply: &str, fetcher: StubFetcher) -> Harness {
    harness_with_config(reply, fetcher, ImportConfig::default())
}

fn harness_with_config(reply: &str, fetcher: StubFetcher, config: ImportConfig) -> Harness {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let store = MemoryStore::new();
    let model = Arc::new(StubModel {
        reply: reply.to_string(),
        calls: AtomicUsize::new(0),
    });
    let importer = Importer::new(
        model.clone(),
        Arc::new(fetcher),
        Arc::new(store.clone()),
        config,
    );
    Harness {
        app: create_router(AppState::new(importer)),
        store,
        model,
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn post_import(app: &Router, body: Value) -> (StatusCode, Value) {
    let request = Request::post("/api/import")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, bytes) = send(app, request).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    let (status, bytes) = send(app, request).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

// ── Import ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn text_import_returns_id_and_inserts_one_row() {
    let h = harness(PANCAKES, StubFetcher::default());

    let (status, body) = post_import(&h.app, json!({ "input": "2 cups flour, milk. Whisk, fry." })).await;

    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert!(body["id"].as_str().is_some(), "body: {body}");
    assert_eq!(h.store.len(), 1);
    assert_eq!(h.model.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unreachable_url_fails_without_inserting() {
    let h = harness(PANCAKES, StubFetcher::default());

    let (status, body) = post_import(&h.app, json!({ "input": "https://example.invalid/404" })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("404"), "got: {message}");
    assert!(h.store.is_empty());
    assert_eq!(h.model.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn url_import_records_source_url() {
    let url = "https://example.com/pancakes";
    let fetcher = StubFetcher {
        pages: HashMap::from([(url.to_string(), "Pancakes 2 cups flour".to_string())]),
    };
    let h = harness(PANCAKES, fetcher);

    let (status, body) = post_import(&h.app, json!({ "input": format!("  {url}  ") })).await;
    assert_eq!(status, StatusCode::OK, "body: {body}");

    let id = body["id"].as_str().unwrap();
    let (_, detail) = get_json(&h.app, &format!("/api/recipes/{id}")).await;
    assert_eq!(detail["source_url"], url);
}

#[tokio::test]
async fn missing_input_is_bad_request() {
    let h = harness(PANCAKES, StubFetcher::default());

    for body in [json!({}), json!({ "input": "" }), json!({ "pdf": "" })] {
        let (status, reply) = post_import(&h.app, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(reply["error"], "No input provided");
    }
    assert!(h.store.is_empty());
    assert_eq!(h.model.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let h = harness(PANCAKES, StubFetcher::default());
    let request = Request::post("/api/import")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, bytes) = send(&h.app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn non_json_model_output_is_unprocessable() {
    let h = harness("I could not find a recipe on that page.", StubFetcher::default());

    let (status, body) = post_import(&h.app, json!({ "input": "hello" })).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], EXTRACTION_FAILED_MESSAGE);
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn fenced_model_output_is_accepted() {
    let h = harness(&format!("```json\n{PANCAKES}\n```"), StubFetcher::default());

    let (status, _) = post_import(&h.app, json!({ "input": "pancakes" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.store.len(), 1);
}

#[tokio::test]
async fn pdf_wins_over_input() {
    let url = "https://example.com/never-fetched";
    let h = harness(PANCAKES, StubFetcher::default());

    let (status, body) = post_import(&h.app, json!({ "input": url, "pdf": "JVBERi0xLjQK" })).await;
    assert_eq!(status, StatusCode::OK, "body: {body}");

    let id = body["id"].as_str().unwrap();
    let (_, detail) = get_json(&h.app, &format!("/api/recipes/{id}")).await;
    assert!(detail["source_url"].is_null());
}

/// `%PDF-1.4\n` followed by `extra` bytes of base64 padding.
fn large_pdf_payload(extra: usize) -> String {
    let mut pdf = String::with_capacity(extra + 12);
    pdf.push_str("JVBERi0xLjQK");
    pdf.extend(std::iter::repeat('A').take(extra));
    pdf
}

#[tokio::test]
async fn multi_megabyte_pdf_is_accepted() {
    let h = harness(PANCAKES, StubFetcher::default());

    let (status, body) = post_import(&h.app, json!({ "pdf": large_pdf_payload(3 * 1024 * 1024) })).await;

    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(h.store.len(), 1);
    assert_eq!(h.model.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn body_over_configured_limit_is_rejected_as_json() {
    let config = ImportConfig::builder()
        .max_request_bytes(64 * 1024)
        .build()
        .unwrap();
    let h = harness_with_config(PANCAKES, StubFetcher::default(), config);

    let (status, body) = post_import(&h.app, json!({ "pdf": large_pdf_payload(128 * 1024) })).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].as_str().unwrap().contains("length limit"), "body: {body}");
    assert!(h.store.is_empty());
    assert_eq!(h.model.calls.load(Ordering::SeqCst), 0);
}

// ── Listing and detail ───────────────────────────────────────────────────────

#[tokio::test]
async fn listing_is_newest_first_summaries() {
    let h = harness(PANCAKES, StubFetcher::default());

    let (_, first) = post_import(&h.app, json!({ "input": "first" })).await;
    let (_, second) = post_import(&h.app, json!({ "input": "second" })).await;

    let (status, list) = get_json(&h.app, "/api/recipes").await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["id"], second["id"]);
    assert_eq!(list[1]["id"], first["id"]);
    assert_eq!(list[0]["name"], "Pancakes");
    assert_eq!(list[0]["tags"], json!(["breakfast", "quick"]));
    assert_eq!(list[0]["cook_time"], "20 minutes • serves 4");
    assert!(list[0].get("ingredients").is_none());
}

#[tokio::test]
async fn detail_includes_notes_blocks() {
    let h = harness(PANCAKES, StubFetcher::default());
    let (_, created) = post_import(&h.app, json!({ "input": "pancakes" })).await;
    let id = created["id"].as_str().unwrap();

    let (status, detail) = get_json(&h.app, &format!("/api/recipes/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["id"], id);
    assert_eq!(detail["ingredients"][1]["note"], "warm");
    assert_eq!(detail["instructions"][1], "Fry in butter.");

    let blocks = detail["notes_blocks"].as_array().unwrap();
    let kinds: Vec<&str> = blocks.iter().map(|b| b["type"].as_str().unwrap()).collect();
    assert_eq!(
        kinds,
        vec![
            "section_header",
            "paragraph",
            "blank_spacer",
            "section_header",
            "substitution_list"
        ]
    );
    assert_eq!(
        blocks[4]["items"],
        json!([
            { "ingredient": "milk", "description": "oat milk" },
            { "ingredient": "butter", "description": "oil" }
        ])
    );
}

#[tokio::test]
async fn markdown_detail() {
    let h = harness(PANCAKES, StubFetcher::default());
    let (_, created) = post_import(&h.app, json!({ "input": "pancakes" })).await;
    let id = created["id"].as_str().unwrap();

    let request = Request::get(format!("/api/recipes/{id}/markdown"))
        .body(Body::empty())
        .unwrap();
    let response = h.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/markdown"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let md = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(md.starts_with("# Pancakes\n"));
    assert!(md.contains("- 1 1/2 cups milk (warm)"));
    assert!(md.contains("- milk: oat milk"));
}

#[tokio::test]
async fn unknown_or_malformed_id_is_not_found() {
    let h = harness(PANCAKES, StubFetcher::default());

    for uri in [
        "/api/recipes/6f1c2a8e-3b7d-4c1e-9a52-0d4f7e8b9c10",
        "/api/recipes/not-a-uuid",
        "/api/recipes/not-a-uuid/markdown",
    ] {
        let (status, body) = get_json(&h.app, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert!(body["error"].as_str().unwrap().contains("not found"));
    }
}

#[tokio::test]
async fn health() {
    let h = harness(PANCAKES, StubFetcher::default());
    let (status, body) = get_json(&h.app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}
