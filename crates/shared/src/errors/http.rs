use crate::errors::{
    error::ErrorResponse, order::OrderError, repository::RepositoryError, service::ServiceError,
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

#[derive(Debug)]
pub enum HttpError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    ServiceUnavailable(String),
    Internal(String),
    Order(OrderError),
}

impl From<ServiceError> for HttpError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Order(order_err) => HttpError::Order(order_err),

            ServiceError::Validation(errors) => {
                HttpError::BadRequest(format!("Validation failed: {}", errors.join("; ")))
            }

            ServiceError::Repo(repo_err) => match repo_err {
                RepositoryError::NotFound => HttpError::NotFound("Not found".into()),
                RepositoryError::Conflict(msg) => HttpError::Conflict(msg),
                RepositoryError::Transient(msg) => {
                    error!("❌ Transient storage failure: {msg}");
                    HttpError::ServiceUnavailable(
                        "Temporary storage failure, please retry".into(),
                    )
                }
                other => {
                    error!("❌ Repository failure: {other}");
                    HttpError::Internal("Repository error".into())
                }
            },

            ServiceError::Jwt(err) => HttpError::Unauthorized(format!("JWT error: {err}")),

            ServiceError::TokenExpired => HttpError::Unauthorized("Token expired".into()),

            ServiceError::InvalidTokenType => HttpError::Unauthorized("Invalid token type".into()),

            ServiceError::Internal(msg) => {
                error!("❌ Internal failure: {msg}");
                HttpError::Internal("Internal server error".into())
            }
        }
    }
}

fn order_status(err: &OrderError) -> StatusCode {
    if err.is_validation() {
        return StatusCode::BAD_REQUEST;
    }

    match err {
        OrderError::VariantNotFound(_) | OrderError::OrderNotFound(_) => StatusCode::NOT_FOUND,
        OrderError::NotAuthorized => StatusCode::FORBIDDEN,
        _ => StatusCode::CONFLICT,
    }
}

impl HttpError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            HttpError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HttpError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            HttpError::Forbidden(_) => StatusCode::FORBIDDEN,
            HttpError::NotFound(_) => StatusCode::NOT_FOUND,
            HttpError::Conflict(_) => StatusCode::CONFLICT,
            HttpError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            HttpError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HttpError::Order(err) => order_status(err),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let (code, message) = match self {
            HttpError::Order(err) => (Some(err.kind().to_string()), err.to_string()),
            HttpError::BadRequest(msg)
            | HttpError::Unauthorized(msg)
            | HttpError::Forbidden(msg)
            | HttpError::NotFound(msg)
            | HttpError::Conflict(msg)
            | HttpError::ServiceUnavailable(msg)
            | HttpError::Internal(msg) => (None, msg),
        };

        let body = Json(ErrorResponse {
            status: "error".into(),
            code,
            message,
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn status_of(err: ServiceError) -> StatusCode {
        HttpError::from(err).status_code()
    }

    #[test]
    fn validation_kinds_are_bad_requests() {
        assert_eq!(
            status_of(OrderError::EmptyOrder.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(OrderError::InvalidPhone("abc".into()).into()),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn state_conflicts_and_authorization_map_to_client_errors() {
        assert_eq!(
            status_of(OrderError::AlreadyCancelled.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(OrderError::OrderNotFound(Uuid::nil()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(OrderError::NotAuthorized.into()),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn transient_storage_failures_are_retryable_server_errors() {
        let err = ServiceError::Repo(RepositoryError::Transient("could not serialize".into()));
        assert_eq!(status_of(err), StatusCode::SERVICE_UNAVAILABLE);

        let err = ServiceError::Repo(RepositoryError::Custom("boom".into()));
        assert_eq!(status_of(err), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
