use crate::error::{AppError, Result};
use crate::model::CreateUrlForm;
use crate::state::AppState;
use axum::extract::rejection::FormRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Form;
use tracing::{debug, info, warn};
use urlcutter_core::{ShortCode, ShortenerError};

/// `POST /create`: stores the `url` form field and answers with the new
/// short code as plain text.
pub async fn create_url_handler(
    State(state): State<AppState>,
    form: std::result::Result<Form<CreateUrlForm>, FormRejection>,
) -> Result<String> {
    let Form(form) = form.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let code = state.shortener().shorten(&form.url).await?;
    info!(code = %code, url = %form.url, "created short url");

    Ok(code.to_string())
}

/// Any other method on `/create`.
pub async fn create_method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// `GET /{key}`: permanent redirect to the stored URL.
///
/// Codes that are malformed, unknown, or point at a non-`http` target all
/// answer 404.
pub async fn redirect_handler(
    Path(key): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    let code = ShortCode::parse(&key).map_err(|e| {
        debug!(key = %key, error = %e, "rejected malformed short code");
        ShortenerError::from(e)
    })?;

    let record = state.shortener().resolve(&code).await?;
    let location = HeaderValue::try_from(record.target_url).map_err(|e| {
        warn!(code = %code, error = %e, "stored url is not a valid header value");
        AppError::NotFound
    })?;

    Ok((StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response())
}
