use crate::error::Result;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Prefix every stored target URL must start with.
pub const URL_SCHEME_PREFIX: &str = "http";

/// A stored URL record in the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlRecord {
    /// The short code the record is stored under.
    pub key: ShortCode,
    /// The original URL that was shortened.
    pub target_url: String,
}

impl UrlRecord {
    /// Whether the target is safe to emit as a redirect location.
    pub fn is_redirectable(&self) -> bool {
        self.target_url.starts_with(URL_SCHEME_PREFIX)
    }
}

/// A read-only view of a repository.
///
/// This trait provides only the read operations from [`Repository`],
/// so components that only resolve codes never hold write access.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Retrieves the URL record for a given short code.
    ///
    /// Returns `Err(CollectionMissing)` if nothing was ever stored and
    /// `Err(NotFound)` if the code is absent or its record is unreadable.
    async fn get(&self, code: &ShortCode) -> Result<UrlRecord>;
}

/// A repository that assigns short codes from its own durable counter.
#[async_trait]
pub trait Repository: ReadRepository {
    /// Stores `target_url` under the next short code and returns that code.
    ///
    /// Advancing the counter and writing the record happen as one unit:
    /// on error neither is visible afterwards.
    async fn insert(&self, target_url: &str) -> Result<ShortCode>;
}
