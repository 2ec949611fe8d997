//! HTTP error response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use adminkit_app::ports::{DatabaseError, PageError, ThemeError};

/// Failure of an admin handler, mapped to a plain-text response.
#[derive(Debug)]
pub(crate) enum HttpError {
    Forbidden,
    NotFound,
    Database(DatabaseError),
    Theme(ThemeError),
    Page(PageError),
}

impl From<DatabaseError> for HttpError {
    fn from(err: DatabaseError) -> Self {
        Self::Database(err)
    }
}

impl From<ThemeError> for HttpError {
    fn from(err: ThemeError) -> Self {
        Self::Theme(err)
    }
}

impl From<PageError> for HttpError {
    fn from(err: PageError) -> Self {
        match err {
            PageError::Forbidden => Self::Forbidden,
            PageError::Database(err) => Self::Database(err),
            other @ PageError::Custom(_) => Self::Page(other),
        }
    }
}

fn internal() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal server error".to_string(),
    )
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Forbidden => (StatusCode::FORBIDDEN, "forbidden".to_string()),
            Self::NotFound | Self::Database(DatabaseError::NotFound) => {
                (StatusCode::NOT_FOUND, "record not found".to_string())
            }
            Self::Database(DatabaseError::Constraint(message)) => (StatusCode::CONFLICT, message),
            Self::Database(err) => {
                tracing::error!(error = ?err, "storage error");
                internal()
            }
            Self::Theme(err) => {
                tracing::error!(error = ?err, "theme error");
                internal()
            }
            Self::Page(err) => {
                tracing::error!(error = ?err, "page error");
                internal()
            }
        };

        (status, message).into_response()
    }
}
