use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde_json::json;

use crate::{Error, ErrorKind};

/// Implements conversion into a json response for all possible error
/// variants.
///
/// # Error message stripping in production
///
/// Backtrace and additional context information (e.g. user information) are
/// never part of the response and only available through the application
/// logs. Internal failures respond with an empty 500.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let payload = |msg: String| Json(json!({ "error": msg }));

        match &self.kind {
            ErrorKind::Forbidden => {
                (StatusCode::FORBIDDEN, payload(self.kind.to_string())).into_response()
            }
            ErrorKind::AuthFailed { .. } => {
                tracing::debug!("{}", self.to_string());
                (StatusCode::UNAUTHORIZED, payload(self.kind.to_string())).into_response()
            }
            ErrorKind::InvalidCredentials => {
                tracing::debug!("{}", self.to_string());
                (StatusCode::UNAUTHORIZED, payload(self.kind.to_string())).into_response()
            }
            ErrorKind::PasswordNotSet => {
                tracing::debug!("{}", self.to_string());
                let msg = if cfg!(debug_assertions) {
                    self.kind.to_string()
                } else {
                    // Don't make it possible for anyone to check if user has
                    // their password set. Return a standard error response
                    // instead.
                    "invalid credentials".to_string()
                };
                (StatusCode::UNAUTHORIZED, payload(msg)).into_response()
            }
            ErrorKind::AccountDisabled | ErrorKind::PendingApproval => {
                tracing::debug!("{}", self.to_string());
                (StatusCode::FORBIDDEN, payload(self.kind.to_string())).into_response()
            }
            ErrorKind::RegistrationClosed(_) => {
                tracing::trace!("{}", self.to_string());
                (StatusCode::FORBIDDEN, payload(self.kind.to_string())).into_response()
            }
            ErrorKind::BadInput(_) | ErrorKind::GalleryFull { .. } | ErrorKind::CategoryInUse(_) => {
                tracing::trace!("{}", self.to_string());
                (StatusCode::BAD_REQUEST, payload(self.kind.to_string())).into_response()
            }
            ErrorKind::CarNotFound(_)
            | ErrorKind::ImageNotFound(_)
            | ErrorKind::CategoryNotFound(_)
            | ErrorKind::UserNotFound(_) => {
                tracing::trace!("{}", self.to_string());
                (StatusCode::NOT_FOUND, payload(self.kind.to_string())).into_response()
            }
            ErrorKind::UserWithEmailAlreadyExists(_) => {
                tracing::trace!("{}", self.to_string());
                (StatusCode::BAD_REQUEST, payload(self.kind.to_string())).into_response()
            }
            _ => {
                tracing::error!("{}", self.to_string());
                (StatusCode::INTERNAL_SERVER_ERROR, "").into_response()
            }
        }
    }
}
