//! Search backend trait.

use crate::error::Result;
use async_trait::async_trait;

/// Source of raw search results pages.
///
/// Implementations must be thread-safe (Send + Sync): one backend is shared
/// by every keyword task of a run.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Fetch the HTML of results page `page` (zero-based) for `keyword`.
    ///
    /// # Errors
    /// Returns error if the request fails, including after retries.
    async fn fetch_page(&self, keyword: &str, page: u32) -> Result<String>;

    /// Short identifier used in log lines.
    fn name(&self) -> &str;
}
