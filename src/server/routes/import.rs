use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;

use crate::pipeline::input::ImportRequest;
use crate::recipe::RecipeId;
use crate::server::error::ApiError;
use crate::server::state::AppState;

/// `max_body_bytes` bounds the JSON body, which carries base64 PDFs.
pub fn routes(max_body_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/import", post(import))
        .layer(DefaultBodyLimit::max(max_body_bytes))
}

#[derive(Debug, Serialize)]
struct ImportResponse {
    id: RecipeId,
}

async fn import(
    State(state): State<AppState>,
    body: Result<Json<ImportRequest>, JsonRejection>,
) -> Result<Json<ImportResponse>, ApiError> {
    let Json(req) = body?;
    let source = req.into_source()?;
    let id = state.importer.import(&source).await?;
    Ok(Json(ImportResponse { id }))
}
