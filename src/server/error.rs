use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::RecipeError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Recipe(#[from] RecipeError),
    #[error("invalid request body: {}", .0.body_text())]
    BadBody(#[from] JsonRejection),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadBody(rejection) => rejection.status(),
            ApiError::Recipe(e) => match e {
                RecipeError::InputMissing | RecipeError::NotAPdf { .. } => StatusCode::BAD_REQUEST,
                RecipeError::ExtractionParse { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                RecipeError::NotFound { .. } => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Recipe(e) => e.user_message(),
            ApiError::BadBody(_) => self.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else if let ApiError::Recipe(RecipeError::ExtractionParse { detail }) = &self {
            tracing::warn!(%detail, "Model output was not a recipe");
        }

        let body = axum::Json(json!({ "error": message }));
        (status, body).into_response()
    }
}
