// src/utils/html_debug.rs
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;

use crate::utils::error::AppError;

/// Patterns highlighted in page snapshots: price cells and the publish date token.
pub const SNAPSHOT_PATTERNS: &[(&str, &str)] = &[
    (r"\$\s*\d+\.\d{2}", "price"),
    (r"\b\d{1,2}/\d{1,2}/\d{2}\b", "date"),
];

/// Saves a HTML document to a file with debug highlights.
/// Overlapping highlights are skipped; the first one (by position) wins.
pub fn save_debug_html(html: &str, path: &Path, highlights: &[(usize, usize, &str)]) -> Result<(), AppError> {
    let mut debug_html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<style>\n");
    debug_html.push_str(".highlight-price { background-color: #90EE90; }\n");
    debug_html.push_str(".highlight-date { background-color: #ADD8E6; }\n");
    debug_html.push_str(".highlight-custom { background-color: #FFC0CB; }\n");
    debug_html.push_str("</style>\n</head>\n<body>\n");

    let mut last_pos = 0;
    let mut sorted_highlights = highlights.to_vec();
    sorted_highlights.sort_by_key(|h| h.0);

    for (start, end, highlight_type) in sorted_highlights {
        if start < last_pos {
            continue;
        }
        debug_html.push_str(&html[last_pos..start]);

        let css_class = match highlight_type {
            "price" => "highlight-price",
            "date" => "highlight-date",
            _ => "highlight-custom",
        };
        debug_html.push_str(&format!(
            "<span class=\"{}\" title=\"Position: {}-{}, Type: {}\">",
            css_class, start, end, highlight_type
        ));
        debug_html.push_str(&html[start..end]);
        debug_html.push_str("</span>");

        last_pos = end;
    }

    debug_html.push_str(&html[last_pos..]);
    debug_html.push_str("\n</body>\n</html>");

    fs::write(path, debug_html)?;
    tracing::debug!("Saved debug HTML to {}", path.display());
    Ok(())
}

/// Creates a debug version of an HTML document with matches of the given regex
/// patterns highlighted. Returns the number of matches found per pattern label.
pub fn create_debug_html(html: &str, path: &Path, patterns: &[(&str, &str)]) -> Result<Vec<(String, usize)>, AppError> {
    let mut highlights = Vec::new();
    let mut counts = Vec::with_capacity(patterns.len());

    for (pattern, highlight_type) in patterns {
        let re = Regex::new(pattern).map_err(|e| {
            AppError::Config(format!("Invalid regex pattern '{}': {}", pattern, e))
        })?;

        let before = highlights.len();
        for mat in re.find_iter(html) {
            highlights.push((mat.start(), mat.end(), *highlight_type));
        }
        counts.push((highlight_type.to_string(), highlights.len() - before));
    }

    save_debug_html(html, path, &highlights)?;
    Ok(counts)
}

/// Sidecar written next to each snapshot.
#[derive(Debug, Serialize)]
struct SnapshotMetadata<'a> {
    name: &'a str,
    url: &'a str,
    bytes: usize,
    highlights: BTreeMap<String, usize>,
    captured_at: String,
}

/// Writes `<dir>/<name>.html` (annotated page) and `<dir>/<name>.json` (where it came from).
pub fn save_page_snapshot(dir: &Path, name: &str, url: &str, html: &str) -> Result<PathBuf, AppError> {
    fs::create_dir_all(dir)?;

    let html_path = dir.join(format!("{}.html", name));
    let counts = create_debug_html(html, &html_path, SNAPSHOT_PATTERNS)?;

    let metadata = SnapshotMetadata {
        name,
        url,
        bytes: html.len(),
        highlights: counts.into_iter().collect(),
        captured_at: chrono::Local::now().to_rfc3339(),
    };
    let metadata_str = serde_json::to_string_pretty(&metadata)
        .map_err(|e| AppError::Processing(format!("Could not serialize snapshot metadata: {}", e)))?;
    fs::write(dir.join(format!("{}.json", name)), metadata_str)?;

    tracing::info!("Saved page snapshot to {}", html_path.display());
    Ok(html_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_highlights_prices_and_date() {
        let dir = tempfile::tempdir().unwrap();
        let html = r#"<div class="average-price">Price as of 1/1/24</div><td>$3.10</td><td>$3.40</td>"#;

        let path = save_page_snapshot(dir.path(), "states", "https://example.test/", html).unwrap();

        let annotated = fs::read_to_string(&path).unwrap();
        assert_eq!(annotated.matches("highlight-price\" title").count(), 2);
        assert_eq!(annotated.matches("highlight-date\" title").count(), 1);

        let sidecar: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("states.json")).unwrap()).unwrap();
        assert_eq!(sidecar["url"], "https://example.test/");
        assert_eq!(sidecar["highlights"]["price"], 2);
    }

    #[test]
    fn test_overlapping_highlights_do_not_duplicate_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overlap.html");
        save_debug_html("abcdef", &path, &[(0, 4, "custom"), (2, 5, "custom")]).unwrap();

        let annotated = fs::read_to_string(&path).unwrap();
        assert!(annotated.contains(">abcd</span>ef"));
    }
}
