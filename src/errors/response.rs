use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};

use crate::errors::AppError;

// The external error contract is deliberately blunt: form handlers catch
// their own failures and re-render, so anything reaching this conversion
// becomes a redirect to the login page (auth) or a bare "ERROR" body with a
// status code matching the error kind. Internal detail goes to the log, not
// the client.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Auth(msg) => {
                tracing::debug!("auth failure: {}", msg);
                Redirect::to(&format!("/loginuser?error={}", urlencoding::encode(&msg)))
                    .into_response()
            }

            AppError::Validation(msg) => {
                tracing::warn!("validation failure: {}", msg);
                (StatusCode::BAD_REQUEST, "ERROR").into_response()
            }

            AppError::NotFound(msg) => {
                tracing::debug!("not found: {}", msg);
                (StatusCode::NOT_FOUND, "ERROR").into_response()
            }

            AppError::Conflict(msg) => {
                tracing::warn!("conflict: {}", msg);
                (StatusCode::CONFLICT, "ERROR").into_response()
            }

            AppError::Mail(e) => {
                tracing::error!("mail dispatch failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "ERROR").into_response()
            }

            AppError::Database(e) => {
                tracing::error!("database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "ERROR").into_response()
            }

            AppError::Hash(e) => {
                tracing::error!("password hash error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "ERROR").into_response()
            }

            AppError::Template(e) => {
                tracing::error!("template error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "ERROR").into_response()
            }
        }
    }
}
