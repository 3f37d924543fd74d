//! Per-keyword CSV output.

use crate::error::{Result, ScanError};
use crate::filter::reportable;
use regex::Regex;
use serptrack_core::{SearchResult, Whitelist};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::info;

/// Column names of every output file, in order.
pub const CSV_HEADER: [&str; 6] = [
    "Keyword",
    "Result Type",
    "Title",
    "Link",
    "Domain",
    "Description",
];

/// Outcome of writing one keyword's file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReport {
    pub path: PathBuf,
    pub rows_written: usize,
}

/// Replace every character outside `[A-Za-z0-9_-]` with `_`.
pub fn sanitize_filename(keyword: &str) -> String {
    static UNSAFE_CHARS: OnceLock<Regex> = OnceLock::new();
    let regex = UNSAFE_CHARS.get_or_init(|| Regex::new(r"[^a-zA-Z0-9_-]").expect("valid regex"));
    regex.replace_all(keyword, "_").into_owned()
}

/// Output path for `keyword` inside `output_dir`.
pub fn output_path(output_dir: &Path, keyword: &str) -> PathBuf {
    output_dir.join(format!("{}.csv", sanitize_filename(keyword)))
}

/// Write the non-whitelisted `results` for `keyword` to its CSV file.
///
/// The file is truncated if it exists. The header row is always written.
pub fn write_results(
    results: &[SearchResult],
    whitelist: &Whitelist,
    output_dir: &Path,
    keyword: &str,
) -> Result<WriteReport> {
    let path = output_path(output_dir, keyword);
    info!(keyword = %keyword, file = %path.display(), "saving results");

    let output_err = |source| ScanError::Output {
        path: path.clone(),
        source,
    };
    fs::create_dir_all(output_dir).map_err(output_err)?;
    let file = File::create(&path).map_err(output_err)?;

    let csv_err = |source| ScanError::Csv {
        path: path.clone(),
        source,
    };
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(file);
    writer.write_record(CSV_HEADER).map_err(csv_err)?;

    let mut rows_written = 0;
    for result in reportable(results, whitelist) {
        writer
            .write_record([
                result.keyword.as_str(),
                result.result_type.label(),
                result.title.as_str(),
                result.link.as_str(),
                result.domain.as_str(),
                result.description.as_str(),
            ])
            .map_err(csv_err)?;
        rows_written += 1;
    }
    writer.flush().map_err(output_err)?;

    info!(
        keyword = %keyword,
        rows = rows_written,
        file = %path.display(),
        "saved {rows_written} filtered results"
    );

    Ok(WriteReport { path, rows_written })
}
