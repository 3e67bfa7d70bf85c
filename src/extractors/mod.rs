// src/extractors/mod.rs
pub mod date;
pub mod table;

use scraper::{ElementRef, Selector};

use crate::utils::error::ParseError;

// Re-export key extraction types for convenience
pub use date::extract_effective_date;
pub use table::JurisdictionRef;

/// Compiles a CSS selector, keeping the offending text in the error.
pub fn parse_selector(selector: &str) -> Result<Selector, ParseError> {
    Selector::parse(selector).map_err(|e| ParseError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Visible text of an element with runs of whitespace collapsed.
pub fn element_text(element: ElementRef) -> String {
    element.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}
