//! Shared types used across serptrack.
//!
//! This module defines the search keyword newtype, the normalized search
//! result record and the domain whitelist.

use crate::error::CoreError;
use std::collections::HashSet;
use std::fmt;

/// Placeholder title for result blocks without a heading.
pub const NO_TITLE: &str = "No title";

/// Placeholder link for result blocks without an anchor `href`.
pub const NO_LINK: &str = "No link";

/// Placeholder domain for result blocks without a link.
pub const NO_DOMAIN: &str = "no domain";

/// Placeholder description for result blocks without a paragraph.
pub const NO_DESCRIPTION: &str = "No description";

/// Newtype for search keywords.
///
/// Keywords are trimmed on construction and must not be empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Keyword(String);

impl Keyword {
    /// Create a new `Keyword` from a string.
    ///
    /// # Errors
    /// Returns error if the keyword is empty after trimming.
    pub fn new(keyword: impl AsRef<str>) -> Result<Self, CoreError> {
        let trimmed = keyword.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CoreError::Validation(
                "invalid keyword: must not be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Category of a search result block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultType {
    /// Unpaid, algorithmically ranked result
    Organic,
    /// Paid/advertising result
    Sponsored,
    /// Non-standard block such as a direct-answer panel
    Other,
}

impl ResultType {
    /// Label written to the "Result Type" output column.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Organic => "Organic",
            Self::Sponsored => "Sponsored",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One normalized search result extracted from a results page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Keyword whose search produced this result
    pub keyword: String,
    /// Category of the block the result came from
    pub result_type: ResultType,
    /// Heading text or [`NO_TITLE`]
    pub title: String,
    /// First anchor `href` or [`NO_LINK`]
    pub link: String,
    /// Lowercased network location of `link` or [`NO_DOMAIN`]
    pub domain: String,
    /// First paragraph text or [`NO_DESCRIPTION`]
    pub description: String,
}

impl SearchResult {
    /// Build a result from the raw pieces found in a block, substituting
    /// placeholders for missing ones and deriving the domain from the link.
    #[must_use]
    pub fn from_parts(
        keyword: &str,
        result_type: ResultType,
        title: Option<String>,
        link: Option<String>,
        description: Option<String>,
    ) -> Self {
        let domain = link
            .as_deref()
            .map_or_else(|| NO_DOMAIN.to_string(), network_location);

        Self {
            keyword: keyword.to_string(),
            result_type,
            title: title.unwrap_or_else(|| NO_TITLE.to_string()),
            link: link.unwrap_or_else(|| NO_LINK.to_string()),
            domain,
            description: description.unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        }
    }

    /// Whether a usable domain was extracted for this result.
    #[must_use]
    pub fn has_domain(&self) -> bool {
        self.domain != NO_DOMAIN
    }
}

/// Lowercased network location (`[userinfo@]host[:port]`) of a link.
///
/// The authority is taken verbatim from the link text, between `//` and the
/// next `/`, `?` or `#`. Links without a `scheme://` or `//` prefix have an
/// empty network location.
#[must_use]
pub fn network_location(link: &str) -> String {
    let authority = if let Some(rest) = link.strip_prefix("//") {
        rest
    } else {
        let Some((scheme, rest)) = link.split_once(':') else {
            return String::new();
        };
        if !is_scheme(scheme) {
            return String::new();
        }
        let Some(rest) = rest.strip_prefix("//") else {
            return String::new();
        };
        rest
    };

    let end = authority
        .find(&['/', '?', '#'][..])
        .unwrap_or(authority.len());
    authority[..end].to_lowercase()
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Set of lowercase domains whose results are excluded from output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Whitelist {
    domains: HashSet<String>,
}

impl Whitelist {
    /// Create an empty whitelist.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `domain` is whitelisted (case-insensitive, exact match).
    #[must_use]
    pub fn contains(&self, domain: &str) -> bool {
        self.domains.contains(&domain.to_lowercase())
    }

    /// Number of distinct domains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    /// Whether the whitelist has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for Whitelist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            domains: iter
                .into_iter()
                .map(|d| d.as_ref().trim().to_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }
}
