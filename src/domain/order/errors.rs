// ============================================================================
// Order Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    /// Payload could not be decoded into the expected shape
    #[error("{0}")]
    MalformedRequest(String),

    #[error("Order not found")]
    NotFound,

    /// Request body exceeded the configured limit (bytes)
    #[error("request body exceeds the {0} byte limit")]
    PayloadTooLarge(usize),

    /// The store could not complete the operation
    #[error("{0}")]
    StorageFailure(String),
}

impl OrderError {
    pub fn malformed(err: impl std::fmt::Display) -> Self {
        OrderError::MalformedRequest(err.to_string())
    }

    pub fn storage(err: impl std::fmt::Display) -> Self {
        OrderError::StorageFailure(err.to_string())
    }

    /// Short label used for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            OrderError::MalformedRequest(_) => "malformed_request",
            OrderError::NotFound => "not_found",
            OrderError::PayloadTooLarge(_) => "payload_too_large",
            OrderError::StorageFailure(_) => "storage_failure",
        }
    }
}

impl From<serde_json::Error> for OrderError {
    fn from(err: serde_json::Error) -> Self {
        OrderError::malformed(err)
    }
}
