use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cardlist_core::query::QueryError;
use serde::Serialize;

/// Failures talking to the Hearthstone catalog API
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Catalog API error [{status}]: {body}")]
    Catalog { status: u16, body: String },

    #[error("Failed to parse catalog response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Error::Parse(err.to_string())
        } else {
            Error::Network(err.to_string())
        }
    }
}

/// Errors a request handler turns into a JSON `{"message"}` response
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("Catalog request failed: {0}")]
    Catalog(#[from] Error),
}

#[derive(Debug, Serialize)]
struct MessageBody {
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Query(_) => StatusCode::BAD_REQUEST,
            ApiError::Catalog(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = MessageBody {
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
