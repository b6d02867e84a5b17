use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use grid_model::ModelError;
use grid_schema::{SchemaError, StoreError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to write markup: {0}")]
    Markup(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Schema(err) if err.is_not_found() => StatusCode::NOT_FOUND,
            ServerError::Schema(SchemaError::UnsupportedLayout(_)) => StatusCode::NOT_IMPLEMENTED,
            ServerError::Schema(_)
            | ServerError::Model(_)
            | ServerError::Store(_)
            | ServerError::Markup(_)
            | ServerError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            ServerError::Store(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}

/// Body of every JSON reply of the save endpoint.
#[derive(Debug, Serialize)]
pub struct SaveReply {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SaveReply {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        (status, Json(SaveReply::failed(self.public_message()))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
