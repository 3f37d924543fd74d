//! serptrack scanner - keyword search scraping pipeline.
//!
//! This crate fetches search engine results pages for a list of keywords,
//! extracts organic, sponsored and other result blocks, drops whitelisted
//! domains and writes one CSV file per keyword.
//!
//! # Features
//!
//! - Concurrent processing of keywords on a bounded pool
//! - Sequential pagination per keyword with a randomized politeness delay
//! - Automatic retry with exponential backoff for transient HTTP failures
//! - Failure isolation: one keyword's error never aborts the others
//!
//! # Example
//!
//! ```rust,ignore
//! use serptrack_scanner::{BingClient, KeywordDriver, KeywordSearch};
//! use std::sync::Arc;
//!
//! let client = BingClient::new(config.search.clone(), config.http.clone())?;
//! let search = Arc::new(KeywordSearch::new(Arc::new(client), config.search.clone()));
//! let driver = KeywordDriver::new(search, Arc::new(whitelist), &config.run.output_dir)
//!     .with_max_workers(config.run.max_workers);
//!
//! let summary = driver.run(keywords).await;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod backend;
pub mod client;
pub mod driver;
#[allow(missing_docs)]
pub mod error;
#[allow(missing_docs)]
pub mod filter;
pub mod input;
pub mod orchestrator;
#[allow(missing_docs)]
pub mod parser;
#[allow(missing_docs)]
pub mod url_builder;
#[allow(missing_docs)]
pub mod writer;

// Re-export commonly used types
pub use backend::SearchBackend;
pub use client::BingClient;
pub use driver::{process_keyword, KeywordDriver, KeywordFailure, KeywordReport, RunSummary};
pub use error::{Result, ScanError};
pub use filter::{drop_without_domain, reportable};
pub use input::{load_keywords, load_whitelist, read_lines};
pub use orchestrator::{KeywordHarvest, KeywordSearch, PageOutcome, StopReason};
pub use parser::{ParsedPage, ResultParser};
pub use url_builder::build_search_url;
pub use writer::{output_path, sanitize_filename, write_results, WriteReport, CSV_HEADER};
