use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use showcase_types::api::Flash;

use crate::flash;

/// Handler error. Every user-facing failure is a redirect carrying a flash
/// message; only unknown records and internal faults produce a status page.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Validation, authorization or business-rule denial.
    #[error("{message}")]
    Redirect { to: String, message: String },

    #[error("not found")]
    NotFound,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn redirect(to: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Redirect {
            to: to.into(),
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Redirect { to, message } => {
                flash::redirect(CookieJar::new(), &to, Flash::error(message))
            }
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not Found").into_response(),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}
