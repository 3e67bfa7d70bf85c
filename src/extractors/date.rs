// src/extractors/date.rs
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::config::DATE_SELECTOR;
use crate::extractors::element_text;

static DATE_ELEMENT: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(DATE_SELECTOR).expect("Failed to compile DATE_ELEMENT selector")
});

/// The date the prices are published for, and whether it actually came from the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectiveDate {
    Parsed(NaiveDate),
    Fallback(NaiveDate),
}

impl EffectiveDate {
    pub fn date(&self) -> NaiveDate {
        match self {
            EffectiveDate::Parsed(date) | EffectiveDate::Fallback(date) => *date,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, EffectiveDate::Fallback(_))
    }
}

/// Reads the publish date (e.g. "Price as of 1/1/24"), or falls back to `today`.
pub fn extract_effective_date(document: &Html, today: NaiveDate) -> EffectiveDate {
    let Some(element) = document.select(&DATE_ELEMENT).next() else {
        tracing::warn!("Date element '{}' not found, using {}", DATE_SELECTOR, today);
        return EffectiveDate::Fallback(today);
    };

    let text = element_text(element);
    match parse_date_token(&text) {
        Some(date) => EffectiveDate::Parsed(date),
        None => {
            tracing::warn!("Could not parse a date from '{}', using {}", text, today);
            EffectiveDate::Fallback(today)
        }
    }
}

/// Parses the last whitespace-separated token as `month/day/2-digit-year`.
pub fn parse_date_token(text: &str) -> Option<NaiveDate> {
    let token = text.split_whitespace().last()?;
    NaiveDate::parse_from_str(token, "%m/%d/%y").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    #[test]
    fn test_parses_short_date_token() {
        let html = Html::parse_document(r#"<div class="average-price">Today's AAA National Average <span>Price as of 1/1/24</span></div>"#);
        let date = extract_effective_date(&html, today());
        assert_eq!(date, EffectiveDate::Parsed(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
        assert!(!date.is_fallback());
    }

    #[test]
    fn test_zero_padded_token() {
        assert_eq!(
            parse_date_token("Price as of 12/05/23"),
            NaiveDate::from_ymd_opt(2023, 12, 5)
        );
    }

    #[test]
    fn test_missing_element_falls_back_to_today() {
        let html = Html::parse_document("<div class=\"other\"><span>1/1/24</span></div>");
        let date = extract_effective_date(&html, today());
        assert_eq!(date, EffectiveDate::Fallback(today()));
        assert_eq!(date.date(), today());
    }

    #[test]
    fn test_unparseable_text_falls_back() {
        for text in ["", "Price as of yesterday", "Price as of 13/45/24", "as of 1/1/2024"] {
            let html = Html::parse_document(&format!(r#"<div class="average-price"><span>{}</span></div>"#, text));
            assert!(extract_effective_date(&html, today()).is_fallback(), "should fall back for '{}'", text);
        }
    }
}
