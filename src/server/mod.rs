//! HTTP surface.
//!
//! | Method | Path                          | Response                          |
//! |--------|-------------------------------|-----------------------------------|
//! | POST   | `/api/import`                 | `{"id": "<uuid>"}`                |
//! | GET    | `/api/recipes`                | summaries, newest first           |
//! | GET    | `/api/recipes/:id`            | full recipe plus `notes_blocks`   |
//! | GET    | `/api/recipes/:id/markdown`   | `text/markdown` rendering         |
//! | GET    | `/api/health`                 | `{"status": "ok"}`                |
//!
//! Every failure body is `{"error": "<message>"}`.

pub mod error;
pub mod routes;
pub mod state;

use tokio::net::TcpListener;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;

/// Serve until Ctrl-C.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let app = create_router(state);
    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutting down");
            }
        })
        .await
}
