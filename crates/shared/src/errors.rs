use actix_web::{error::ResponseError, HttpResponse};
use std::fmt;

/// Uniform JSON error response for the server's read-only REST surface.
/// Every handler fault surfaces as `500 { "error": <message> }` per the
/// spec's "favor availability over completeness" error policy — the server
/// itself never exits because a single request failed.
#[derive(Debug)]
pub struct ApiError {
    pub message: String,
    pub status_code: u16,
}

impl ApiError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: 500,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: 400,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(actix_web::http::StatusCode::from_u16(self.status_code).unwrap())
            .json(serde_json::json!({ "error": self.message }))
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::internal(err.to_string())
    }
}
