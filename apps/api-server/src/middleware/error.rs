//! Error handling - RFC 7807 responses plus the redirect-with-notice
//! recoveries for not-found and page-overflow conditions.

use actix_web::{HttpResponse, ResponseError, http::StatusCode, http::header};
use quill_shared::response::{ErrorResponse, FieldViolation, RedirectNotice};
use std::fmt;

use quill_core::error::{DomainError, RepoError};
use quill_core::pagination::PageOverflow;
use quill_core::ports::{AttachmentError, JobQueueError};

/// The safe default view users are sent back to when a lookup or a page
/// request cannot be satisfied.
pub const DEFAULT_VIEW: &str = "/api/posts";

/// Application-level error type.
///
/// `NotFound` and `PageOverflow` deliberately render as 303 redirects with
/// a non-fatal notice: a missing id, a filtered-out id, and a page past the
/// end all land the caller back on the default listing. A raw storage error
/// never reaches the client.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    PageOverflow { available: u64 },
    BadRequest(String),
    Unauthorized,
    Forbidden,
    Conflict(String),
    Validation {
        errors: Vec<FieldViolation>,
        submitted: serde_json::Value,
    },
    Internal(String),
}

impl AppError {
    /// Attach the submitted parameters to a domain validation failure so
    /// the client can re-present the form without losing user input.
    pub fn validation(err: DomainError, submitted: serde_json::Value) -> Self {
        match err {
            DomainError::Validation(fields) => AppError::Validation {
                errors: fields
                    .into_iter()
                    .map(|f| FieldViolation {
                        field: f.field,
                        message: f.message,
                    })
                    .collect(),
                submitted,
            },
            other => other.into(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::PageOverflow { available } => {
                write!(f, "Page overflow (last page is {})", available)
            }
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Unauthorized => write!(f, "Unauthorized"),
            AppError::Forbidden => write!(f, "Forbidden"),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Validation { errors, .. } => write!(f, "Validation errors: {:?}", errors),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::SEE_OTHER,
            AppError::PageOverflow { .. } => StatusCode::SEE_OTHER,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::NotFound(notice) => redirect_with_notice(notice),
            AppError::PageOverflow { .. } => redirect_with_notice("No more posts available"),
            AppError::BadRequest(detail) => {
                HttpResponse::BadRequest().json(ErrorResponse::bad_request(detail))
            }
            AppError::Unauthorized => {
                HttpResponse::Unauthorized().json(ErrorResponse::unauthorized())
            }
            AppError::Forbidden => HttpResponse::Forbidden().json(ErrorResponse::forbidden()),
            AppError::Conflict(detail) => HttpResponse::Conflict()
                .json(ErrorResponse::new(409, "Conflict").with_detail(detail)),
            AppError::Validation { errors, submitted } => HttpResponse::UnprocessableEntity()
                .json(
                    ErrorResponse::unprocessable(errors.clone())
                        .with_submitted(submitted.clone()),
                ),
            AppError::Internal(detail) => {
                // Log internal errors; clients get an opaque 500.
                tracing::error!("Internal error: {}", detail);
                HttpResponse::InternalServerError().json(ErrorResponse::internal_error())
            }
        }
    }
}

/// 303 to the default listing carrying a user-visible notice.
fn redirect_with_notice(notice: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, DEFAULT_VIEW))
        .json(RedirectNotice::new(notice, DEFAULT_VIEW))
}

// Conversion from domain errors
impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, id } => {
                tracing::debug!(%id, entity_type, "Entity not found");
                AppError::NotFound(format!("{} not found", entity_type))
            }
            DomainError::Validation(fields) => {
                AppError::validation(DomainError::Validation(fields), serde_json::Value::Null)
            }
            DomainError::Unauthorized => AppError::Unauthorized,
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(msg) => AppError::Conflict(msg),
            RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

impl From<PageOverflow> for AppError {
    fn from(err: PageOverflow) -> Self {
        AppError::PageOverflow {
            available: err.available,
        }
    }
}

impl From<JobQueueError> for AppError {
    fn from(err: JobQueueError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<AttachmentError> for AppError {
    fn from(err: AttachmentError) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
