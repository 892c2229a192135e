pub mod health;
pub mod import;
pub mod recipes;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::server::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let max_body_bytes = state.importer.config().max_request_bytes;
    Router::new()
        .nest("/api", api_routes(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes(max_body_bytes: usize) -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(import::routes(max_body_bytes))
        .merge(recipes::routes())
}
