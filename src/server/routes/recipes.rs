use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::error::RecipeError;
use crate::notes::{parse_notes, NoteBlock};
use crate::recipe::{Recipe, RecipeId, RecipeSummary};
use crate::render::render_recipe;
use crate::server::error::ApiError;
use crate::server::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_recipes))
        .route("/recipes/:id", get(get_recipe))
        .route("/recipes/:id/markdown", get(get_recipe_markdown))
}

#[derive(Debug, Serialize)]
struct RecipeDetail {
    #[serde(flatten)]
    recipe: Recipe,
    notes_blocks: Vec<NoteBlock>,
}

async fn list_recipes(State(state): State<AppState>) -> Result<Json<Vec<RecipeSummary>>, ApiError> {
    Ok(Json(state.store.list().await?))
}

/// Unknown and malformed ids are both reported as not found.
async fn load(state: &AppState, raw_id: &str) -> Result<Recipe, RecipeError> {
    let not_found = || RecipeError::NotFound {
        id: raw_id.to_string(),
    };
    let id: RecipeId = raw_id.parse().map_err(|_| not_found())?;
    state.store.get(id).await?.ok_or_else(not_found)
}

async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RecipeDetail>, ApiError> {
    let recipe = load(&state, &id).await?;
    let notes_blocks = recipe.notes.as_deref().map(parse_notes).unwrap_or_default();
    Ok(Json(RecipeDetail {
        recipe,
        notes_blocks,
    }))
}

async fn get_recipe_markdown(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let recipe = load(&state, &id).await?;
    Ok((
        [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
        render_recipe(&recipe),
    ))
}
