use crate::repository::UrlRecord;
use crate::shortcode::ShortCode;
use async_trait::async_trait;

type Result<T> = std::result::Result<T, crate::error::ShortenerError>;

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Validates `target_url`, stores it and returns the issued short code.
    async fn shorten(&self, target_url: &str) -> Result<ShortCode>;

    /// Resolves a short code to its stored URL record.
    /// Returns `Err(NotFound)` if the code was never issued.
    async fn resolve(&self, code: &ShortCode) -> Result<UrlRecord>;
}
