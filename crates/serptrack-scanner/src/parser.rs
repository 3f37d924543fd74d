use scraper::{ElementRef, Html, Selector};
use serptrack_core::{ResultType, SearchResult};

/// Results extracted from one page, grouped by block category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    pub organic: Vec<SearchResult>,
    pub sponsored: Vec<SearchResult>,
    pub other: Vec<SearchResult>,
}

impl ParsedPage {
    /// Combined number of result blocks on the page.
    #[must_use]
    pub fn total(&self) -> usize {
        self.organic.len() + self.sponsored.len() + self.other.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// All results: organic first, then sponsored, then other.
    #[must_use]
    pub fn into_results(self) -> Vec<SearchResult> {
        let mut results = self.organic;
        results.extend(self.sponsored);
        results.extend(self.other);
        results
    }
}

/// Extracts result blocks from Bing results markup.
///
/// Organic blocks are `li.b_algo`, sponsored blocks `li.b_ad` and other
/// blocks (answer panels and the like) `li.b_ans`.
pub struct ResultParser {
    organic: Selector,
    sponsored: Selector,
    other: Selector,
    heading: Selector,
    anchor: Selector,
    paragraph: Selector,
}

impl ResultParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            organic: selector("li.b_algo"),
            sponsored: selector("li.b_ad"),
            other: selector("li.b_ans"),
            heading: selector("h2"),
            anchor: selector("a"),
            paragraph: selector("p"),
        }
    }

    pub fn parse(&self, html: &str, keyword: &str) -> ParsedPage {
        let document = Html::parse_document(html);

        ParsedPage {
            organic: self.parse_blocks(&document, &self.organic, keyword, ResultType::Organic),
            sponsored: self.parse_blocks(
                &document,
                &self.sponsored,
                keyword,
                ResultType::Sponsored,
            ),
            other: self.parse_blocks(&document, &self.other, keyword, ResultType::Other),
        }
    }

    fn parse_blocks(
        &self,
        document: &Html,
        blocks: &Selector,
        keyword: &str,
        result_type: ResultType,
    ) -> Vec<SearchResult> {
        document
            .select(blocks)
            .map(|block| self.parse_block(&block, keyword, result_type))
            .collect()
    }

    fn parse_block(
        &self,
        block: &ElementRef,
        keyword: &str,
        result_type: ResultType,
    ) -> SearchResult {
        // Only the first anchor counts, even when it has no href.
        let link = block
            .select(&self.anchor)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(ToString::to_string);

        SearchResult::from_parts(
            keyword,
            result_type,
            first_text(block, &self.heading),
            link,
            first_text(block, &self.paragraph),
        )
    }
}

impl Default for ResultParser {
    fn default() -> Self {
        Self::new()
    }
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

fn first_text(element: &ElementRef, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
}
