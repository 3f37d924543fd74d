//! Per-keyword pagination.
//!
//! [`KeywordSearch`] walks the results pages of one keyword strictly in
//! sequence. Every page evaluation yields a [`PageOutcome`]: either the
//! parsed records and a request to continue, or a [`StopReason`]. Records
//! collected before a stop are always kept.

use crate::backend::SearchBackend;
use crate::filter::drop_without_domain;
use crate::parser::ResultParser;
use rand::Rng;
use serptrack_core::{Keyword, SearchConfig, SearchResult};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Why pagination for a keyword ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// A page came back with no result blocks
    Exhausted,
    /// The request failed, including after retries
    RequestFailed(String),
    /// `search.max_pages` pages were fetched
    PageLimit,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted => f.write_str("no more results"),
            Self::RequestFailed(reason) => write!(f, "request failed: {reason}"),
            Self::PageLimit => f.write_str("page limit reached"),
        }
    }
}

/// Result of evaluating a single results page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// The page had results; fetch the next one
    Continue(Vec<SearchResult>),
    /// Stop paginating
    Stop(StopReason),
}

/// Everything gathered for one keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordHarvest {
    /// Keyword that was searched
    pub keyword: Keyword,
    /// Results with a usable domain, in page order
    pub results: Vec<SearchResult>,
    /// Pages that returned a successful response
    pub pages_fetched: u32,
    /// Why pagination ended
    pub stop_reason: StopReason,
    /// Results removed because no domain could be extracted
    pub dropped_without_domain: usize,
}

/// Drives fetching and parsing of result pages for a keyword.
pub struct KeywordSearch {
    backend: Arc<dyn SearchBackend>,
    parser: ResultParser,
    config: SearchConfig,
}

impl KeywordSearch {
    /// Create a search over `backend` with the given pagination settings.
    #[must_use]
    pub fn new(backend: Arc<dyn SearchBackend>, config: SearchConfig) -> Self {
        Self {
            backend,
            parser: ResultParser::new(),
            config,
        }
    }

    /// Fetch and parse one page.
    pub async fn fetch_page(&self, keyword: &Keyword, page: u32) -> PageOutcome {
        let html = match self.backend.fetch_page(keyword.as_str(), page).await {
            Ok(html) => html,
            Err(e) => {
                error!(
                    keyword = %keyword,
                    page = page + 1,
                    backend = self.backend.name(),
                    "failed to retrieve page {} for '{}': {}",
                    page + 1,
                    keyword,
                    e
                );
                return PageOutcome::Stop(StopReason::RequestFailed(e.to_string()));
            }
        };

        let parsed = self.parser.parse(&html, keyword.as_str());
        let count = parsed.total();
        info!(
            keyword = %keyword,
            page = page + 1,
            "found {count} results on page {} for '{}'",
            page + 1,
            keyword
        );

        if parsed.is_empty() {
            info!(keyword = %keyword, "no more results found for '{}', stopping search", keyword);
            return PageOutcome::Stop(StopReason::Exhausted);
        }

        PageOutcome::Continue(parsed.into_results())
    }

    /// Paginate through results for `keyword` until a stop condition.
    pub async fn run(&self, keyword: &Keyword) -> KeywordHarvest {
        info!(keyword = %keyword, "starting search for keyword '{}'", keyword);

        let mut collected = Vec::new();
        let mut pages_fetched = 0;
        let mut stop_reason = StopReason::PageLimit;

        for page in 0..self.config.max_pages {
            info!(
                keyword = %keyword,
                page = page + 1,
                "fetching page {} for '{}'",
                page + 1,
                keyword
            );

            match self.fetch_page(keyword, page).await {
                PageOutcome::Continue(results) => {
                    pages_fetched += 1;
                    collected.extend(results);

                    let delay = self.politeness_delay();
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                PageOutcome::Stop(reason) => {
                    if reason == StopReason::Exhausted {
                        pages_fetched += 1;
                    }
                    stop_reason = reason;
                    break;
                }
            }
        }

        let (results, dropped) = drop_without_domain(collected);
        if dropped > 0 {
            warn!(
                keyword = %keyword,
                removed = dropped,
                "removed {dropped} results without a valid domain for '{}'",
                keyword
            );
        }

        info!(
            keyword = %keyword,
            valid = results.len(),
            pages = pages_fetched,
            reason = %stop_reason,
            "completed search for '{}' with {} valid results",
            keyword,
            results.len()
        );

        KeywordHarvest {
            keyword: keyword.clone(),
            results,
            pages_fetched,
            stop_reason,
            dropped_without_domain: dropped,
        }
    }

    /// Uniformly random pause between pages.
    ///
    /// An inverted range collapses to `delay_min_ms`.
    fn politeness_delay(&self) -> Duration {
        let min = self.config.delay_min_ms;
        let max = self.config.delay_max_ms.max(min);
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}
