use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use storefront_core::errors::{ApplicationError, DomainError, InterfaceError};
use storefront_db::RepositoryError;
use tracing::{error, warn};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub correlation_id: String,
}

/// Handler error. Caller-facing classes (bad request, not found, conflict)
/// carry their own message; the rest only expose the generic user message.
#[derive(Debug)]
pub struct ApiError(pub InterfaceError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
            InterfaceError::Conflict { .. } => StatusCode::CONFLICT,
            InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> ErrorBody {
        let error = match &self.0 {
            InterfaceError::BadRequest { message, .. }
            | InterfaceError::NotFound { message, .. }
            | InterfaceError::Conflict { message, .. } => message.clone(),
            other => other.user_message().to_string(),
        };
        ErrorBody { error, correlation_id: self.0.correlation_id().to_string() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::from(ApplicationError::Domain(DomainError::InvalidInput(message.into())))
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::from(ApplicationError::Domain(DomainError::not_found(entity, id)))
    }
}

impl From<ApplicationError> for ApiError {
    fn from(value: ApplicationError) -> Self {
        let correlation_id = Uuid::new_v4().simple().to_string();
        let mapped = value.into_interface(correlation_id);
        match &mapped {
            InterfaceError::ServiceUnavailable { message, correlation_id }
            | InterfaceError::Internal { message, correlation_id } => error!(
                event_name = "api.request.failed",
                correlation_id = %correlation_id,
                error = %message,
                "request failed"
            ),
            other => warn!(
                event_name = "api.request.rejected",
                correlation_id = %other.correlation_id(),
                error = %other,
                "request rejected"
            ),
        }
        Self(mapped)
    }
}

impl From<RepositoryError> for ApiError {
    fn from(value: RepositoryError) -> Self {
        Self::from(ApplicationError::from(value))
    }
}

impl From<DomainError> for ApiError {
    fn from(value: DomainError) -> Self {
        Self::from(ApplicationError::Domain(value))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
