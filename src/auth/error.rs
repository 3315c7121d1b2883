use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{error, warn};

use crate::auth::{dto::MessageResponse, password::PasswordError, repo::StoreError};

/// Outcomes of signup/login other than success.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),
    #[error("email and password are required")]
    MissingCredentials,
    #[error("user already exists")]
    DuplicateUser,
    #[error("user not found")]
    UserNotFound,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error(transparent)]
    StoreUnavailable(StoreError),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => AuthError::DuplicateUser,
            other => AuthError::StoreUnavailable(other),
        }
    }
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidBody(_)
            | Self::MissingCredentials
            | Self::DuplicateUser
            | Self::UserNotFound
            | Self::InvalidCredentials => StatusCode::BAD_REQUEST,
            Self::StoreUnavailable(_) | Self::Password(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-safe text; server faults never leak their cause.
    pub fn message(&self) -> &'static str {
        match self {
            Self::InvalidBody(_) => "Invalid request body",
            Self::MissingCredentials => "Email and password are required",
            Self::DuplicateUser => "User already exists",
            Self::UserNotFound => "User not found",
            Self::InvalidCredentials => "Invalid password",
            Self::StoreUnavailable(_) | Self::Password(_) | Self::Internal(_) => {
                "Internal server error"
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else if let Self::InvalidBody(rejection) = &self {
            warn!(error = %rejection, "rejected request body");
        }
        (
            status,
            Json(MessageResponse {
                message: self.message().into(),
            }),
        )
            .into_response()
    }
}
