// src/extractors/table.rs
use std::str::FromStr;

use once_cell::sync::Lazy;
use reqwest::Url;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};

use crate::config::{METRO_NAMES_SELECTOR, METRO_TABLES_SELECTOR, STATE_HEADERS_SELECTOR, STATE_ROWS_SELECTOR};
use crate::extractors::element_text;
use crate::utils::error::ParseError;

// --- CSS Selectors (Lazy Static) ---
static STATE_HEADERS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(STATE_HEADERS_SELECTOR).expect("Failed to compile STATE_HEADERS selector")
});

static STATE_ROWS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(STATE_ROWS_SELECTOR).expect("Failed to compile STATE_ROWS selector")
});

static METRO_NAMES: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(METRO_NAMES_SELECTOR).expect("Failed to compile METRO_NAMES selector")
});

static METRO_TABLES: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(METRO_TABLES_SELECTOR).expect("Failed to compile METRO_TABLES selector")
});

// Relative to a single table
static TABLE_HEADERS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("thead > tr > th").expect("Failed to compile TABLE_HEADERS selector"));
static TABLE_BODY_ROWS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tbody > tr").expect("Failed to compile TABLE_BODY_ROWS selector"));
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("Failed to compile CELL selector"));
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("Failed to compile LINK selector"));

// --- Data Structures ---

/// A state as listed in the top-level table. Identity is the abbreviation.
#[derive(Debug, Clone)]
pub struct JurisdictionRef {
    pub name: String,
    pub abbreviation: String,
    pub source_url: Option<Url>, // the state's own page, followed for metro runs
}

impl PartialEq for JurisdictionRef {
    fn eq(&self, other: &Self) -> bool {
        self.abbreviation == other.abbreviation
    }
}

impl Eq for JurisdictionRef {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetroRef {
    pub name: String,
    pub parent: JurisdictionRef,
}

#[derive(Debug, Clone)]
pub struct StateRow {
    pub jurisdiction: JurisdictionRef,
    pub prices: Vec<Decimal>,
}

/// The flat state table: grade labels from the header, one row per state.
#[derive(Debug, Clone)]
pub struct StateTable {
    pub grades: Vec<String>,
    pub rows: Vec<StateRow>,
}

/// A metro name and the price table rendered under it.
#[derive(Debug, Clone, Copy)]
pub struct MetroSection<'a> {
    pub name: &'a str,
    pub table: ElementRef<'a>,
}

#[derive(Debug, Clone)]
pub struct MetroPrices {
    pub metro: MetroRef,
    pub grades: Vec<String>,
    pub prices: Vec<Decimal>,
}

// --- Cell parsing ---

/// "$3.10" -> 3.10, keeping the sourced scale. Anything else is fatal.
pub fn parse_price(text: &str) -> Result<Decimal, ParseError> {
    let cleaned = text.replace('$', "");
    let cleaned = cleaned.trim();
    let invalid = || ParseError::InvalidPrice { text: text.to_string() };

    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(invalid());
    }
    Decimal::from_str(cleaned).map_err(|_| invalid())
}

/// `...?state=tx` -> `TX`: whatever follows the last `=`, upper-cased.
pub fn abbreviation_from_href(href: &str) -> String {
    href.rsplit('=').next().unwrap_or(href).trim().to_uppercase()
}

/// Header labels after the leading name column.
fn grade_labels<'a>(headers: impl Iterator<Item = ElementRef<'a>>) -> Vec<String> {
    headers.skip(1).map(element_text).collect()
}

/// Price cells after the leading name/label cell.
fn row_prices(row: ElementRef) -> Result<Vec<Decimal>, ParseError> {
    row.select(&CELL).skip(1).map(|cell| parse_price(&element_text(cell))).collect()
}

/// Reads the state link out of the first cell of a row.
pub fn parse_jurisdiction_cell(cell: ElementRef, base: &Url) -> Result<JurisdictionRef, ParseError> {
    let link = cell
        .select(&LINK)
        .next()
        .ok_or_else(|| ParseError::MissingElement(format!("state link in '{}'", element_text(cell))))?;
    let href = link.value().attr("href").map(str::trim).unwrap_or_default();
    let abbreviation = abbreviation_from_href(href);
    if href.is_empty() || abbreviation.is_empty() {
        return Err(ParseError::InvalidLink {
            href: href.to_string(),
            reason: format!("no state abbreviation for '{}'", element_text(link)),
        });
    }

    let source_url = base.join(href).map_err(|e| ParseError::InvalidLink {
        href: href.to_string(),
        reason: e.to_string(),
    })?;

    Ok(JurisdictionRef {
        name: element_text(link),
        abbreviation,
        source_url: Some(source_url),
    })
}

fn parse_state_row(row: ElementRef, base: &Url, with_prices: bool) -> Result<StateRow, ParseError> {
    let first = row
        .select(&CELL)
        .next()
        .ok_or_else(|| ParseError::MissingElement("state row without cells".to_string()))?;
    let jurisdiction = parse_jurisdiction_cell(first, base)?;
    let prices = if with_prices { row_prices(row)? } else { Vec::new() };
    Ok(StateRow { jurisdiction, prices })
}

// --- Flat (state) variant ---

/// Parses the state averages table. Any bad price aborts the whole table.
pub fn parse_state_table(document: &Html, base: &Url) -> Result<StateTable, ParseError> {
    let grades = grade_labels(document.select(&STATE_HEADERS));
    let rows = document
        .select(&STATE_ROWS)
        .map(|row| parse_state_row(row, base, true))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!("Parsed {} state rows with grades {:?}", rows.len(), grades);
    Ok(StateTable { grades, rows })
}

/// Only the state links of the table, for walking the per-state pages.
pub fn parse_state_links(document: &Html, base: &Url) -> Result<Vec<JurisdictionRef>, ParseError> {
    document
        .select(&STATE_ROWS)
        .map(|row| parse_state_row(row, base, false).map(|r| r.jurisdiction))
        .collect()
}

// --- Nested (metro) variant ---

/// Pairs metro headings with their tables by position, once.
/// The page renders them in the same order; extras on either side are dropped.
pub fn pair_metro_sections<'a>(document: &'a Html, names: &'a [String]) -> Vec<MetroSection<'a>> {
    let tables: Vec<ElementRef<'a>> = document.select(&METRO_TABLES).collect();
    if names.len() != tables.len() {
        tracing::warn!(
            "Found {} metro names but {} metro tables; pairing the first {}",
            names.len(),
            tables.len(),
            names.len().min(tables.len())
        );
    }
    names
        .iter()
        .zip(tables)
        .map(|(name, table)| MetroSection { name: name.as_str(), table })
        .collect()
}

/// Metro names in page order.
pub fn metro_names(document: &Html) -> Vec<String> {
    document.select(&METRO_NAMES).map(element_text).collect()
}

/// Grade labels and the first body row of a metro table. Later rows are ignored.
pub fn parse_metro_table(table: ElementRef) -> Result<(Vec<String>, Vec<Decimal>), ParseError> {
    let grades = grade_labels(table.select(&TABLE_HEADERS));
    let prices = match table.select(&TABLE_BODY_ROWS).next() {
        Some(row) => row_prices(row)?,
        None => Vec::new(),
    };
    Ok((grades, prices))
}

/// Every metro of one state page, in page order.
pub fn parse_metro_prices(document: &Html, parent: &JurisdictionRef) -> Result<Vec<MetroPrices>, ParseError> {
    let names = metro_names(document);
    pair_metro_sections(document, &names)
        .into_iter()
        .map(|section| {
            let (grades, prices) = parse_metro_table(section.table)?;
            Ok(MetroPrices {
                metro: MetroRef {
                    name: section.name.to_string(),
                    parent: parent.clone(),
                },
                grades,
                prices,
            })
        })
        .collect()
}
