//! Error taxonomy for the request path.

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use thiserror::Error;

/// Errors that can occur while serving an API request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A request parameter failed validation. Maps to HTTP 400; the message
    /// is returned to the client verbatim.
    #[error("{0}")]
    InvalidParameter(String),

    /// A read against the store failed. Maps to HTTP 500.
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
}

impl actix_web::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            log::error!("Request failed: {self}");
        }
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string(),
        }))
    }
}

/// Errors that can occur during startup seeding. The caller logs these and
/// continues serving (possibly with an empty store).
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid seed payload: {0}")]
    Parse(#[from] serde_path_to_error::Error<serde_json::Error>),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
}
