//! API error types for handler operations
//!
//! Structured errors for the REST surface, with HTTP status mapping via
//! `IntoResponse`. Every error renders the same body:
//!
//! ```json
//! {"error": "...", "code": "OFFSET_BEYOND_TOTAL", "status": 416, "operation": "list"}
//! ```
//!
//! # Example
//!
//! ```rust
//! use notes_service::handlers::{ApiError, ApiErrorKind};
//!
//! let error = ApiError::not_found("note 65f1a2b3c4d5e6f708091a2b not found");
//! assert!(matches!(error.kind, ApiErrorKind::NotFound));
//! assert_eq!(error.kind.error_code(), "NOT_FOUND");
//! ```

use std::fmt;

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    listing::ListError,
    notes::NoteValidationError,
    store::{StoreError, StoreErrorKind, StoreOperation},
};

const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Operation being performed when the API error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    /// Listing notes
    List,
    /// Getting a single note by id
    Get,
    /// Creating a note
    Create,
    /// Updating a note
    Update,
    /// Deleting a note
    Delete,
}

impl fmt::Display for ApiOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => write!(f, "list"),
            Self::Get => write!(f, "get"),
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Category of API error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// A cursor or anchor could not be decoded
    InvalidCursor,
    /// Page size out of bounds
    InvalidLimit,
    /// Invalid request format or parameters
    BadRequest,
    /// Caller identity missing
    Unauthorized,
    /// Note was not found
    NotFound,
    /// Offset past the end of the result set
    OffsetBeyondTotal,
    /// Note input failed validation
    ValidationFailed,
    /// Internal server error
    InternalError,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCursor => write!(f, "invalid_cursor"),
            Self::InvalidLimit => write!(f, "invalid_limit"),
            Self::BadRequest => write!(f, "bad_request"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::NotFound => write!(f, "not_found"),
            Self::OffsetBeyondTotal => write!(f, "offset_beyond_total"),
            Self::ValidationFailed => write!(f, "validation_failed"),
            Self::InternalError => write!(f, "internal_error"),
        }
    }
}

impl ApiErrorKind {
    /// Get the HTTP status code for this error kind
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidCursor | Self::InvalidLimit | Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::OffsetBeyondTotal => StatusCode::RANGE_NOT_SATISFIABLE,
            Self::ValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code string for this error kind
    #[must_use]
    pub fn error_code(&self) -> String {
        format!("{}", self).to_uppercase()
    }
}

/// Structured API error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// The operation being performed when the error occurred
    pub operation: ApiOperation,
    /// The category of error
    pub kind: ApiErrorKind,
    /// Human-readable error message
    pub message: String,
}

impl ApiError {
    /// Create a new API error
    pub fn new(operation: ApiOperation, kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
        }
    }

    /// Create a "not found" error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ApiOperation::Get, ApiErrorKind::NotFound, message)
    }

    /// Create a validation failed error
    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ApiOperation::Create, ApiErrorKind::ValidationFailed, message)
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ApiOperation::List, ApiErrorKind::BadRequest, message)
    }

    /// Create an unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ApiOperation::Get, ApiErrorKind::Unauthorized, message)
    }

    /// Set the operation that caused the error
    #[must_use]
    pub fn with_operation(mut self, operation: ApiOperation) -> Self {
        self.operation = operation;
        self
    }

    /// True for failures on the server side
    pub fn is_server_error(&self) -> bool {
        self.kind.status_code().is_server_error()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "API {} error during {}: {}",
            self.kind, self.operation, self.message
        )
    }
}

impl std::error::Error for ApiError {}

/// Response body for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: String,
    pub code: String,
    pub status: u16,
    pub operation: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.kind.status_code();

        if self.is_server_error() {
            tracing::error!(
                operation = %self.operation,
                kind = %self.kind,
                "API error: {}", self.message
            );
        } else {
            tracing::debug!(
                operation = %self.operation,
                kind = %self.kind,
                "API error: {}", self.message
            );
        }

        let response = ApiErrorResponse {
            error: self.message,
            code: self.kind.error_code(),
            status: status.as_u16(),
            operation: self.operation.to_string(),
        };

        (status, Json(response)).into_response()
    }
}

/// Convert StoreOperation to ApiOperation
fn store_operation_to_api_operation(op: StoreOperation) -> ApiOperation {
    match op {
        StoreOperation::Find | StoreOperation::Count => ApiOperation::List,
        StoreOperation::FindOne => ApiOperation::Get,
        StoreOperation::Insert => ApiOperation::Create,
        StoreOperation::Update => ApiOperation::Update,
        StoreOperation::Delete => ApiOperation::Delete,
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        let operation = store_operation_to_api_operation(err.operation);
        match err.kind {
            StoreErrorKind::NotFound => Self::new(operation, ApiErrorKind::NotFound, err.message),
            _ => Self::new(operation, ApiErrorKind::InternalError, INTERNAL_MESSAGE),
        }
    }
}

impl From<ListError> for ApiError {
    fn from(err: ListError) -> Self {
        let kind = match &err {
            ListError::InvalidCursor(_) => ApiErrorKind::InvalidCursor,
            ListError::InvalidLimit(_) => ApiErrorKind::InvalidLimit,
            ListError::BadRequest(_) => ApiErrorKind::BadRequest,
            ListError::OffsetBeyondTotal { .. } => ApiErrorKind::OffsetBeyondTotal,
            ListError::NotFound(_) => ApiErrorKind::NotFound,
            ListError::Store { .. } => ApiErrorKind::InternalError,
        };

        // Store details stay in the logs
        let message = match kind {
            ApiErrorKind::InternalError => INTERNAL_MESSAGE.to_string(),
            _ => err.to_string(),
        };

        Self::new(ApiOperation::List, kind, message)
    }
}

impl From<NoteValidationError> for ApiError {
    fn from(err: NoteValidationError) -> Self {
        Self::validation_failed(err.to_string())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text()).with_operation(ApiOperation::Get)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text()).with_operation(ApiOperation::Create)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::NoteId;
    use crate::listing::{Cursor, ListModeKind, SortField};

    #[test]
    fn test_api_error_kind_status_codes() {
        assert_eq!(ApiErrorKind::InvalidCursor.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiErrorKind::InvalidLimit.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiErrorKind::BadRequest.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiErrorKind::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiErrorKind::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiErrorKind::OffsetBeyondTotal.status_code(),
            StatusCode::RANGE_NOT_SATISFIABLE
        );
        assert_eq!(
            ApiErrorKind::ValidationFailed.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiErrorKind::InternalError.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_api_error_kind_error_codes() {
        assert_eq!(ApiErrorKind::InvalidCursor.error_code(), "INVALID_CURSOR");
        assert_eq!(ApiErrorKind::InvalidLimit.error_code(), "INVALID_LIMIT");
        assert_eq!(ApiErrorKind::OffsetBeyondTotal.error_code(), "OFFSET_BEYOND_TOTAL");
        assert_eq!(ApiErrorKind::ValidationFailed.error_code(), "VALIDATION_FAILED");
        assert_eq!(ApiErrorKind::InternalError.error_code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_list_errors_map_to_kinds() {
        let cursor_err = Cursor::decode("!!!", SortField::Title).unwrap_err();
        let cases = [
            (ListError::from(cursor_err), ApiErrorKind::InvalidCursor),
            (ListError::InvalidLimit(0), ApiErrorKind::InvalidLimit),
            (ListError::bad_request("nope"), ApiErrorKind::BadRequest),
            (
                ListError::OffsetBeyondTotal { offset: 5, total: 5 },
                ApiErrorKind::OffsetBeyondTotal,
            ),
            (ListError::NotFound("gone".to_string()), ApiErrorKind::NotFound),
        ];

        for (err, kind) in cases {
            let api = ApiError::from(err);
            assert_eq!(api.kind, kind);
            assert_eq!(api.operation, ApiOperation::List);
        }
    }

    #[test]
    fn test_store_failure_hides_details() {
        let err = ListError::Store {
            mode: ListModeKind::Anchor,
            source: StoreError::connection_failed(StoreOperation::Count, "10.0.0.7 refused"),
        };
        let api = ApiError::from(err);

        assert_eq!(api.kind, ApiErrorKind::InternalError);
        assert_eq!(api.message, INTERNAL_MESSAGE);
        assert!(api.is_server_error());
    }

    #[test]
    fn test_store_error_conversion() {
        let missing = ApiError::from(StoreError::new(
            StoreOperation::Update,
            StoreErrorKind::NotFound,
            "no such note",
        ));
        assert_eq!(missing.kind, ApiErrorKind::NotFound);
        assert_eq!(missing.operation, ApiOperation::Update);

        let failed = ApiError::from(StoreError::query_failed(StoreOperation::Insert, "boom"));
        assert_eq!(failed.kind, ApiErrorKind::InternalError);
        assert_eq!(failed.operation, ApiOperation::Create);
        assert_eq!(failed.message, INTERNAL_MESSAGE);
    }

    #[test]
    fn test_validation_error_conversion() {
        let api = ApiError::from(NoteValidationError {
            field: "title",
            max: 200,
        });
        assert_eq!(api.kind, ApiErrorKind::ValidationFailed);
        assert!(api.message.contains("title"));
    }

    #[tokio::test]
    async fn test_into_response_body() {
        let response = ApiError::from(ListError::OffsetBeyondTotal {
            offset: 3,
            total: 3,
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let parsed: ApiErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed.code, "OFFSET_BEYOND_TOTAL");
        assert_eq!(parsed.status, 416);
        assert_eq!(parsed.operation, "list");
        assert!(parsed.error.contains("offset 3"));
    }

    #[test]
    fn test_display() {
        let error = ApiError::not_found(format!("note {} not found", NoteId::from_parts(1, 1)));
        assert!(error.to_string().starts_with("API not_found error during get"));
    }
}
