use async_trait::async_trait;
use serptrack_core::{Keyword, SearchConfig, Whitelist};
use serptrack_scanner::{
    load_keywords, load_whitelist, KeywordDriver, KeywordSearch, Result, ScanError, SearchBackend,
    StopReason,
};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Serves canned pages per keyword; keywords without pages always fail.
struct MockBackend {
    pages: HashMap<String, Vec<String>>,
}

impl MockBackend {
    fn new() -> Self {
        Self {
            pages: HashMap::new(),
        }
    }

    fn with_pages(mut self, keyword: &str, pages: Vec<String>) -> Self {
        self.pages.insert(keyword.to_string(), pages);
        self
    }
}

#[async_trait]
impl SearchBackend for MockBackend {
    async fn fetch_page(&self, keyword: &str, page: u32) -> Result<String> {
        let Some(pages) = self.pages.get(keyword) else {
            return Err(ScanError::HttpStatus {
                url: format!("https://www.bing.com/search?q={keyword}&first={}", page * 10),
                status: 503,
            });
        };
        Ok(pages
            .get(page as usize)
            .cloned()
            .unwrap_or_else(|| "<html><body><ol id=\"b_results\"></ol></body></html>".to_string()))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

fn organic(title: &str, link: &str, description: &str) -> String {
    format!(
        r#"<li class="b_algo"><h2><a href="{link}">{title}</a></h2><div class="b_caption"><p>{description}</p></div></li>"#
    )
}

fn results_page(items: &[String]) -> String {
    format!(
        "<html><body><ol id=\"b_results\">{}</ol></body></html>",
        items.concat()
    )
}

fn search_config() -> SearchConfig {
    SearchConfig {
        delay_min_ms: 0,
        delay_max_ms: 0,
        ..SearchConfig::default()
    }
}

fn driver(backend: MockBackend, whitelist: Whitelist, output_dir: &Path) -> KeywordDriver {
    let search = Arc::new(KeywordSearch::new(Arc::new(backend), search_config()));
    KeywordDriver::new(search, Arc::new(whitelist), output_dir)
}

fn test_backend() -> MockBackend {
    MockBackend::new().with_pages(
        "test",
        vec![results_page(&[
            organic("Test - Wikipedia", "https://wikipedia.org/Test", "Encyclopedia entry"),
            organic("Example X", "https://example.com/x", "An example page"),
        ])],
    )
}

#[tokio::test]
async fn test_end_to_end_whitelist_filtering() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let keywords_file = temp_dir.path().join("keywords.txt");
    let whitelist_file = temp_dir.path().join("whitelist.txt");
    fs::write(&keywords_file, "test\n").expect("write keywords");
    fs::write(&whitelist_file, "wikipedia.org\n").expect("write whitelist");

    let keywords = load_keywords(&keywords_file).expect("load keywords");
    let whitelist = load_whitelist(&whitelist_file).expect("load whitelist");

    let summary = driver(test_backend(), whitelist, temp_dir.path())
        .run(keywords)
        .await;

    assert!(summary.failed.is_empty());
    assert_eq!(summary.succeeded.len(), 1);
    let report = &summary.succeeded[0];
    assert_eq!(report.results_found, 2);
    assert_eq!(report.rows_written, 1);
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.stop_reason, StopReason::Exhausted);

    let mut reader = csv::Reader::from_path(temp_dir.path().join("test.csv")).expect("open csv");
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.expect("row")).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][0], "test");
    assert_eq!(&rows[0][1], "Organic");
    assert_eq!(&rows[0][2], "Example X");
    assert_eq!(&rows[0][3], "https://example.com/x");
    assert_eq!(&rows[0][4], "example.com");
    assert_eq!(&rows[0][5], "An example page");
}

#[tokio::test]
async fn test_whitelist_matching_ignores_file_casing() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let whitelist_file = temp_dir.path().join("whitelist.txt");
    fs::write(&whitelist_file, "WIKIPEDIA.ORG\nExample.COM\n").expect("write whitelist");
    let whitelist = load_whitelist(&whitelist_file).expect("load whitelist");

    let backend = MockBackend::new().with_pages(
        "test",
        vec![results_page(&[
            organic("Upper", "https://Example.com/Upper", "d"),
            organic("Kept", "https://kept.example.net/", "d"),
        ])],
    );
    let summary = driver(backend, whitelist, temp_dir.path())
        .run(vec![Keyword::new("test").expect("valid keyword")])
        .await;

    assert_eq!(summary.total_rows(), 1);
    let contents = fs::read_to_string(temp_dir.path().join("test.csv")).expect("read csv");
    assert!(contents.contains("kept.example.net"));
    assert!(!contents.contains("Upper"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_failing_keyword_does_not_affect_others() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let keywords = vec![
        Keyword::new("broken").expect("valid keyword"),
        Keyword::new("test").expect("valid keyword"),
    ];

    let summary = driver(test_backend(), Whitelist::new(), temp_dir.path())
        .run(keywords)
        .await;

    // A network failure stops pagination but still produces a (header-only) file.
    assert_eq!(summary.attempted(), 2);
    assert!(summary.failed.is_empty());

    let broken = summary
        .succeeded
        .iter()
        .find(|r| r.keyword.as_str() == "broken")
        .expect("broken keyword report");
    assert!(matches!(broken.stop_reason, StopReason::RequestFailed(_)));
    assert_eq!(broken.rows_written, 0);

    let test = summary
        .succeeded
        .iter()
        .find(|r| r.keyword.as_str() == "test")
        .expect("test keyword report");
    assert_eq!(test.rows_written, 2);
    assert!(temp_dir.path().join("test.csv").exists());
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("broken.csv")).expect("read csv"),
        "Keyword,Result Type,Title,Link,Domain,Description\r\n"
    );
}

#[tokio::test]
async fn test_runs_are_byte_identical() {
    let first_dir = TempDir::new().expect("create temp dir");
    let second_dir = TempDir::new().expect("create temp dir");

    let pages = vec![
        results_page(&[
            organic("One", "https://one.example.com/", "first, with comma"),
            r#"<li class="b_ad"><h2>Ad "quoted"</h2><a href="https://ads.example.com/">a</a></li>"#
                .to_string(),
            r#"<li class="b_ans"><h2>Answer</h2></li>"#.to_string(),
        ]),
        results_page(&[organic("Two", "https://two.example.com/", "second")]),
    ];
    let whitelist: Whitelist = ["two.example.com"].into_iter().collect();
    let keywords = vec![
        Keyword::new("rust web").expect("valid keyword"),
        Keyword::new("test").expect("valid keyword"),
    ];

    for dir in [&first_dir, &second_dir] {
        let backend = test_backend().with_pages("rust web", pages.clone());
        let summary = driver(backend, whitelist.clone(), dir.path())
            .run(keywords.clone())
            .await;
        assert_eq!(summary.succeeded.len(), 2);
    }

    for file in ["rust_web.csv", "test.csv"] {
        let first = fs::read(first_dir.path().join(file)).expect("read first run");
        let second = fs::read(second_dir.path().join(file)).expect("read second run");
        assert_eq!(first, second, "{file} differs between runs");
    }

    let contents = fs::read_to_string(first_dir.path().join("rust_web.csv")).expect("read csv");
    let lines: Vec<&str> = contents.split("\r\n").filter(|l| !l.is_empty()).collect();
    assert_eq!(lines.len(), 3, "header, organic and sponsored rows: {contents}");
    assert!(lines[1].starts_with("rust web,Organic,One,"));
    assert!(lines[2].starts_with("rust web,Sponsored,\"Ad \"\"quoted\"\"\","));
}

#[tokio::test]
async fn test_pagination_stops_at_page_limit() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let pages: Vec<String> = (0..60)
        .map(|i| {
            results_page(&[organic(
                &format!("Result {i}"),
                &format!("https://site{i}.example.com/"),
                "d",
            )])
        })
        .collect();
    let backend = MockBackend::new().with_pages("deep", pages);

    let summary = driver(backend, Whitelist::new(), temp_dir.path())
        .run(vec![Keyword::new("deep").expect("valid keyword")])
        .await;

    let report = &summary.succeeded[0];
    assert_eq!(report.stop_reason, StopReason::PageLimit);
    assert_eq!(report.pages_fetched, 50);
    assert_eq!(report.rows_written, 50);
}
