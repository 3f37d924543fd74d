//! serptrack core - foundation crate for the keyword search tracker.
//!
//! This crate provides shared types, error handling and configuration
//! management that the scanner crate and the binary depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with env overrides
//! - [`types`] - `Keyword`, `SearchResult`, `ResultType` and `Whitelist`
//!
//! # Example
//!
//! ```rust
//! use serptrack_core::{AppConfig, Whitelist};
//!
//! let config = AppConfig::default();
//! assert_eq!(config.search.max_pages, 50);
//!
//! let whitelist: Whitelist = ["Wikipedia.org"].into_iter().collect();
//! assert!(whitelist.contains("wikipedia.org"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, HttpConfig, RetryConfig, RunConfig, SearchConfig};
pub use error::{ConfigError, ConfigResult, CoreError};
pub use types::{
    network_location, Keyword, ResultType, SearchResult, Whitelist, NO_DESCRIPTION, NO_DOMAIN,
    NO_LINK, NO_TITLE,
};
