//! HTTP surface: presenters, content negotiation and the axum router.

pub mod presenter;
pub mod server;

pub use presenter::{respond, Format};
pub use server::{create_router, HttpServer};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::error::KintreeError;

/// Error returned by handlers, rendered as `{"error": "<message>"}`.
#[derive(Debug)]
pub struct ApiError(pub KintreeError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            KintreeError::PersonNotFound(_) | KintreeError::RelationshipNotFound(_) => StatusCode::NOT_FOUND,
            KintreeError::InvalidInput(_) | KintreeError::Parse(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<KintreeError> for ApiError {
    fn from(err: KintreeError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            log::error!("[api] {}", self.0);
        }
        (status, Json(serde_json::json!({"error": self.0.to_string()}))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError(KintreeError::PersonNotFound("x".into())).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError(KintreeError::RelationshipNotFound("x".into())).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError(KintreeError::InvalidInput("x".into())).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError(KintreeError::Parse("x".into())).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError(KintreeError::Config("x".into())).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
