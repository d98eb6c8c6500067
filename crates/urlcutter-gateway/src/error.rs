use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;
use urlcutter_core::ShortenerError;

pub type Result<T> = std::result::Result<T, AppError>;

/// Request-level failures, each mapped to one HTTP status.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Only POST method allowed")]
    MethodNotAllowed,
    #[error("Incorrect input: {0}")]
    BadRequest(String),
    #[error("Short code not found")]
    NotFound,
    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MethodNotAllowed | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ShortenerError> for AppError {
    fn from(error: ShortenerError) -> Self {
        match error {
            ShortenerError::InvalidUrl(message) => AppError::BadRequest(message),
            ShortenerError::InvalidShortCode(_) | ShortenerError::NotFound(_) => AppError::NotFound,
            ShortenerError::Encode(_) | ShortenerError::Storage(_) => {
                AppError::Internal(error.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal(ref source) = self {
            error!(error = %source, "request failed");
        }

        (self.status(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortener_errors_map_to_statuses() {
        let cases = [
            (ShortenerError::InvalidUrl("x".into()), StatusCode::BAD_REQUEST),
            (ShortenerError::InvalidShortCode("x".into()), StatusCode::NOT_FOUND),
            (ShortenerError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ShortenerError::Encode("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ShortenerError::Storage("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, status) in cases {
            assert_eq!(AppError::from(error).status(), status);
        }
    }

    #[test]
    fn internal_details_stay_out_of_the_body() {
        let error = AppError::Internal("disk full at /var/lib/urlcutter".into());
        assert_eq!(error.to_string(), "Internal server error");
    }
}
