use axum::{http::StatusCode, response::IntoResponse};
use validator::ValidationErrors;

use crate::{auth::error::AuthError, db::error::StoreError};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Store error")]
    Store(StoreError),

    #[error("Auth error")]
    Auth(AuthError),

    #[error("Record not found")]
    NotFound,

    #[error("Movie already logged by user")]
    AlreadyLogged,

    #[error("Review already made")]
    DuplicateReview,

    #[error("Mutation targets another user's data")]
    UnauthorizedMutation,

    #[error("Metadata lookup failed: {0}")]
    UpstreamLookup(anyhow::Error),

    #[error("Validation error")]
    Validation(ValidationErrors),

    #[error("Other error: {0}")]
    Other(anyhow::Error),
}

impl From<StoreError> for Error {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<AuthError> for Error {
    fn from(value: AuthError) -> Self {
        Self::Auth(value)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        match self {
            Error::Store(store_error) => match store_error {
                StoreError::Database(error) => {
                    tracing::error!(err.msg = %error, err.details = ?error, "Store Error");

                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
            },
            Error::Auth(auth_error) => match auth_error {
                AuthError::JwtError(error) => {
                    tracing::error!(err.msg = %error, err.details = ?error, "JWT Error");

                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
                AuthError::Unauthenticated => StatusCode::UNAUTHORIZED.into_response(),
                AuthError::UserNotFound => StatusCode::UNAUTHORIZED.into_response(),
            },
            Error::NotFound => StatusCode::NOT_FOUND.into_response(),
            Error::AlreadyLogged => {
                (StatusCode::BAD_REQUEST, "movie already seen by user").into_response()
            }
            Error::DuplicateReview => {
                (StatusCode::CONFLICT, "review already made").into_response()
            }
            Error::UnauthorizedMutation => StatusCode::FORBIDDEN.into_response(),
            Error::UpstreamLookup(error) => {
                tracing::error!(err.msg = %error, err.details = ?error, "Metadata Lookup Error");

                StatusCode::BAD_GATEWAY.into_response()
            }
            Error::Validation(validation_error) => {
                tracing::error!(err.msg = %validation_error, err.details = ?validation_error, "Validation Error");

                (StatusCode::BAD_REQUEST, validation_error.to_string()).into_response()
            }
            Error::Other(error) => {
                tracing::error!(err.msg = %error, err.details = ?error, "Other Error");

                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
