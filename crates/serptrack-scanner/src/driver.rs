//! Concurrent per-keyword pipeline.
//!
//! [`KeywordDriver`] runs one task per keyword (search, then write) on a
//! bounded pool. Tasks share only the read-only whitelist and the search
//! backend. A failing or panicking task is logged and recorded in the
//! [`RunSummary`]; it never cancels its siblings.

use crate::error::{Result, ScanError};
use crate::orchestrator::{KeywordSearch, StopReason};
use crate::writer::{output_path, write_results};
use futures::stream::{FuturesUnordered, StreamExt};
use serptrack_core::{Keyword, Whitelist};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinError;
use tracing::{error, info, warn};

/// Outcome of a keyword that was searched and written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordReport {
    /// Keyword that was processed
    pub keyword: Keyword,
    /// CSV file written for the keyword
    pub path: PathBuf,
    /// Results with a usable domain before whitelist filtering
    pub results_found: usize,
    /// Rows written after whitelist filtering
    pub rows_written: usize,
    /// Pages that returned a successful response
    pub pages_fetched: u32,
    /// Why pagination ended
    pub stop_reason: StopReason,
}

/// A keyword whose task failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordFailure {
    /// Keyword whose task failed
    pub keyword: String,
    /// Error message
    pub error: String,
}

/// Aggregated outcome of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Keywords processed successfully, in completion order
    pub succeeded: Vec<KeywordReport>,
    /// Keywords whose task failed, in completion order
    pub failed: Vec<KeywordFailure>,
}

impl RunSummary {
    /// Total CSV rows written across all keywords.
    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.succeeded.iter().map(|r| r.rows_written).sum()
    }

    /// Number of keywords that were attempted.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    fn record(&mut self, keyword: String, outcome: Result<KeywordReport>) {
        match outcome {
            Ok(report) => self.succeeded.push(report),
            Err(e) => {
                error!(keyword = %keyword, "{}", e);
                self.failed.push(KeywordFailure {
                    keyword,
                    error: e.to_string(),
                });
            }
        }
    }
}

/// Runs the per-keyword pipeline over a bounded pool of tasks.
pub struct KeywordDriver {
    search: Arc<KeywordSearch>,
    whitelist: Arc<Whitelist>,
    output_dir: PathBuf,
    max_workers: usize,
}

impl KeywordDriver {
    /// Create a driver writing into `output_dir`.
    #[must_use]
    pub fn new(
        search: Arc<KeywordSearch>,
        whitelist: Arc<Whitelist>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            search,
            whitelist,
            output_dir: output_dir.into(),
            max_workers: 10,
        }
    }

    /// Set the maximum number of keywords processed at once.
    #[must_use]
    pub fn with_max_workers(mut self, max: usize) -> Self {
        self.max_workers = max.max(1);
        self
    }

    /// Pool size for `keyword_count` keywords.
    #[must_use]
    pub fn pool_size(&self, keyword_count: usize) -> usize {
        self.max_workers.min(keyword_count)
    }

    /// Keep the first keyword for each output file, in input order.
    ///
    /// Keywords that repeat, or that sanitize to the same file name as an
    /// earlier one, are skipped so no two tasks write the same file.
    #[must_use]
    pub fn unique_by_output(&self, keywords: Vec<Keyword>) -> Vec<Keyword> {
        let mut claimed = HashSet::new();
        keywords
            .into_iter()
            .filter(|keyword| {
                let path = output_path(&self.output_dir, keyword.as_str());
                let first = claimed.insert(path.clone());
                if !first {
                    warn!(
                        keyword = %keyword,
                        file = %path.display(),
                        "skipping '{}': {} is already written by an earlier keyword",
                        keyword,
                        path.display()
                    );
                }
                first
            })
            .collect()
    }

    /// Process every keyword and wait for all tasks to finish.
    pub async fn run(&self, keywords: Vec<Keyword>) -> RunSummary {
        let mut summary = RunSummary::default();
        let keywords = self.unique_by_output(keywords);
        let pool_size = self.pool_size(keywords.len());
        if pool_size == 0 {
            info!("no keywords to process");
            return summary;
        }

        info!(
            keywords = keywords.len(),
            workers = pool_size,
            "starting search for {} keywords with up to {} concurrent workers",
            keywords.len(),
            pool_size
        );

        let mut tasks = FuturesUnordered::new();

        for keyword in keywords {
            let name = keyword.to_string();
            let handle = tokio::spawn(process_keyword(
                self.search.clone(),
                self.whitelist.clone(),
                self.output_dir.clone(),
                keyword,
            ));
            tasks.push(async move {
                let outcome = handle.await.unwrap_or_else(|e| Err(join_failure(&name, e)));
                (name, outcome)
            });

            // Respect concurrency limit
            while tasks.len() >= pool_size {
                if let Some((name, outcome)) = tasks.next().await {
                    summary.record(name, outcome);
                }
            }
        }

        // Collect remaining results
        while let Some((name, outcome)) = tasks.next().await {
            summary.record(name, outcome);
        }

        summary
    }
}

/// Search one keyword, then write its filtered results.
pub async fn process_keyword(
    search: Arc<KeywordSearch>,
    whitelist: Arc<Whitelist>,
    output_dir: PathBuf,
    keyword: Keyword,
) -> Result<KeywordReport> {
    let harvest = search.run(&keyword).await;
    let written = write_results(&harvest.results, &whitelist, &output_dir, keyword.as_str())?;

    info!(keyword = %keyword, "completed processing for '{}'", keyword);

    Ok(KeywordReport {
        keyword,
        path: written.path,
        results_found: harvest.results.len(),
        rows_written: written.rows_written,
        pages_fetched: harvest.pages_fetched,
        stop_reason: harvest.stop_reason,
    })
}

fn join_failure(keyword: &str, err: JoinError) -> ScanError {
    let reason = if err.is_panic() {
        let payload = err.into_panic();
        payload
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string())
    } else {
        err.to_string()
    };

    ScanError::TaskPanicked {
        keyword: keyword.to_string(),
        reason,
    }
}
