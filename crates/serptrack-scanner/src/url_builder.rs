use crate::error::Result;
use serptrack_core::SearchConfig;
use url::Url;

/// Build the results URL for `keyword` at zero-based `page`.
///
/// The keyword is sent as the `q` parameter and the page as the `first`
/// result offset (`page * results_per_page`).
pub fn build_search_url(config: &SearchConfig, keyword: &str, page: u32) -> Result<Url> {
    let offset = u64::from(page) * u64::from(config.results_per_page);

    let mut url = Url::parse(&config.endpoint)?;
    url.query_pairs_mut()
        .append_pair("q", keyword)
        .append_pair("first", &offset.to_string());

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_first_page() {
        let config = SearchConfig::default();
        let url = build_search_url(&config, "rust", 0).expect("should build URL");

        assert_eq!(url.as_str(), "https://www.bing.com/search?q=rust&first=0");
    }

    #[test]
    fn test_build_url_offset_and_encoding() {
        let config = SearchConfig::default();
        let url = build_search_url(&config, "c++ & rust", 3).expect("should build URL");

        assert_eq!(
            url.as_str(),
            "https://www.bing.com/search?q=c%2B%2B+%26+rust&first=30"
        );
    }

    #[test]
    fn test_build_url_custom_stride() {
        let config = SearchConfig {
            endpoint: "http://127.0.0.1:8080/search".to_string(),
            results_per_page: 20,
            ..SearchConfig::default()
        };
        let url = build_search_url(&config, "x", 2).expect("should build URL");

        assert_eq!(url.as_str(), "http://127.0.0.1:8080/search?q=x&first=40");
    }

    #[test]
    fn test_build_url_rejects_relative_endpoint() {
        let config = SearchConfig {
            endpoint: "/search".to_string(),
            ..SearchConfig::default()
        };
        assert!(build_search_url(&config, "x", 0).is_err());
    }
}
