use serptrack_core::{SearchResult, Whitelist};

/// Split off results that have no usable domain.
///
/// Returns the kept results and the number removed.
pub fn drop_without_domain(results: Vec<SearchResult>) -> (Vec<SearchResult>, usize) {
    let before = results.len();
    let kept: Vec<SearchResult> = results.into_iter().filter(SearchResult::has_domain).collect();
    let removed = before - kept.len();
    (kept, removed)
}

/// Results whose domain is not whitelisted, in their original order.
pub fn reportable<'a>(
    results: &'a [SearchResult],
    whitelist: &'a Whitelist,
) -> impl Iterator<Item = &'a SearchResult> + 'a {
    results.iter().filter(|r| !whitelist.contains(&r.domain))
}
