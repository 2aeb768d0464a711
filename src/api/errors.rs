use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

use crate::domain::order::OrderError;

// ============================================================================
// HTTP mapping for OrderError
// ============================================================================
//
// 400 carries the decoder message, 404 a fixed message, 413 the body limit.
// 500 carries the store's own error text, which is useful while developing but
// leaks internals; it has to be replaced by a generic message before exposing
// the service publicly.
//
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ResponseError for OrderError {
    fn status_code(&self) -> StatusCode {
        match self {
            OrderError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            OrderError::NotFound => StatusCode::NOT_FOUND,
            OrderError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            OrderError::StorageFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}
