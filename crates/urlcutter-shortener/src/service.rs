use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, trace, warn};
use urlcutter_core::{
    Repository, ShortCode, Shortener, ShortenerError, UrlRecord, URL_SCHEME_PREFIX,
};

/// A concrete implementation of the `Shortener` trait.
///
/// This service wraps a `Repository` and handles:
/// - URL validation before anything reaches storage
/// - Short code assignment, delegated to the repository's counter
/// - Filtering records that are not safe to redirect to
///
/// No retries are performed; storage failures are returned as-is.
#[derive(Debug)]
pub struct ShortenerService<R> {
    repository: Arc<R>,
}

impl<R> Clone for ShortenerService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: Repository> ShortenerService<R> {
    /// Creates a new `ShortenerService` owning the repository.
    pub fn new(repository: R) -> Self {
        Self::with_shared(Arc::new(repository))
    }

    /// Creates a new `ShortenerService` over a repository the caller keeps a
    /// handle to, e.g. to close it at shutdown.
    pub fn with_shared(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Validates that the URL carries an `http` or `https` scheme prefix.
    fn validate_url(url: &str) -> Result<(), ShortenerError> {
        if url.is_empty() {
            return Err(ShortenerError::InvalidUrl(
                "URL cannot be empty".to_string(),
            ));
        }

        if !url.starts_with(URL_SCHEME_PREFIX) {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL must start with '{}': {}",
                URL_SCHEME_PREFIX, url
            )));
        }

        // The target ends up in a `Location` header, which cannot carry these.
        if url.chars().any(|c| c.is_ascii_control()) {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL must not contain control characters: {:?}",
                url
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl<R: Repository> Shortener for ShortenerService<R> {
    async fn shorten(&self, target_url: &str) -> Result<ShortCode, ShortenerError> {
        Self::validate_url(target_url)?;

        let code = self.repository.insert(target_url).await?;
        debug!(code = %code, url = %target_url, "shortened url");

        Ok(code)
    }

    async fn resolve(&self, code: &ShortCode) -> Result<UrlRecord, ShortenerError> {
        trace!(code = %code, "resolving short code");

        let record = self.repository.get(code).await?;
        if !record.is_redirectable() {
            warn!(code = %code, url = %record.target_url, "stored url is not redirectable");
            return Err(ShortenerError::NotFound(code.to_string()));
        }

        debug!(code = %code, url = %record.target_url, "resolved short code");
        Ok(record)
    }
}
