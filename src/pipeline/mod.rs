// src/pipeline/mod.rs
//! One run: load, wait, scrape, assemble, write. Strictly sequential.

use std::path::PathBuf;

use chrono::NaiveDate;
use scraper::Html;

use crate::assemble::{Dataset, DatasetKind, PriceRecord};
use crate::browser::{wait_until_ready, PageSession};
use crate::config::{
    ScrapeConfig, DATE_SELECTOR, METRO_EXPAND_SELECTOR, METRO_NAMES_SELECTOR, METRO_TABLES_SELECTOR,
    STATE_HEADERS_SELECTOR, STATE_ROWS_SELECTOR,
};
use crate::extractors::{extract_effective_date, table, JurisdictionRef};
use crate::storage::StorageManager;
use crate::utils::error::{AppError, ParseError};
use crate::utils::html_debug;

/// Scrapes one dataset and writes it. Nothing is written unless every step succeeded.
pub async fn run<S: PageSession>(
    kind: DatasetKind,
    session: &mut S,
    config: &ScrapeConfig,
    storage: &StorageManager,
    today: NaiveDate,
) -> Result<PathBuf, AppError> {
    let dataset = match kind {
        DatasetKind::State => scrape_state_dataset(session, config, today).await?,
        DatasetKind::Metro => scrape_metro_dataset(session, config, today).await?,
    };

    if dataset.is_empty() {
        tracing::warn!("No {} rows were parsed; writing a header-only file.", kind.dir_name());
    }

    tracing::info!("Saving data ...");
    let path = storage.save_dataset(&dataset)?;
    tracing::info!("Saving data finished.");
    Ok(path)
}

/// Navigates and waits for the given selectors, snapshotting the page in debug mode.
async fn load_page<S: PageSession>(
    session: &mut S,
    config: &ScrapeConfig,
    url: &str,
    selectors: &[&str],
    snapshot: (DatasetKind, &str),
) -> Result<(), AppError> {
    session.navigate(url).await?;
    wait_until_ready(session, selectors, config.wait_timeout, config.poll_interval).await?;

    if let Some(debug_dir) = config.debug_dir() {
        let (kind, name) = snapshot;
        let page = session.current_page()?;
        if let Err(e) = html_debug::save_page_snapshot(&debug_dir.join(kind.dir_name()), name, page.url.as_str(), &page.html) {
            tracing::warn!("Failed to save page snapshot: {}", e);
        }
    }
    Ok(())
}

fn effective_date(document: &Html, today: NaiveDate) -> NaiveDate {
    let date = extract_effective_date(document, today);
    if date.is_fallback() {
        tracing::warn!("Publish date unavailable, using run date {}", date.date());
    } else {
        tracing::info!("Prices are published for {}", date.date());
    }
    date.date()
}

pub async fn scrape_state_dataset<S: PageSession>(
    session: &mut S,
    config: &ScrapeConfig,
    today: NaiveDate,
) -> Result<Dataset, AppError> {
    tracing::info!("Requesting page ...");
    load_page(
        session,
        config,
        &config.source_url,
        &[DATE_SELECTOR, STATE_HEADERS_SELECTOR, STATE_ROWS_SELECTOR],
        (DatasetKind::State, "states"),
    )
    .await?;
    tracing::info!("Requesting page finished.");

    tracing::info!("Parsing data ...");
    let page = session.current_page()?;
    let document = page.document();
    let date = effective_date(&document, today);
    let parsed = table::parse_state_table(&document, &page.url)?;

    let mut dataset = Dataset::new(DatasetKind::State, date);
    for row in &parsed.rows {
        dataset.push(PriceRecord::assemble(&row.jurisdiction, None, &parsed.grades, &row.prices, date));
    }
    tracing::info!("Parsing data finished ({} states).", dataset.len());
    Ok(dataset)
}

pub async fn scrape_metro_dataset<S: PageSession>(
    session: &mut S,
    config: &ScrapeConfig,
    today: NaiveDate,
) -> Result<Dataset, AppError> {
    tracing::info!("Requesting page ...");
    load_page(
        session,
        config,
        &config.source_url,
        &[DATE_SELECTOR, STATE_ROWS_SELECTOR],
        (DatasetKind::Metro, "states"),
    )
    .await?;
    tracing::info!("Requesting page finished.");

    let (date, states) = {
        let page = session.current_page()?;
        let document = page.document();
        let date = effective_date(&document, today);
        tracing::info!("Parsing states data ...");
        let states = table::parse_state_links(&document, &page.url)?;
        tracing::info!("Parsing state data finished ({} states).", states.len());
        (date, states)
    };

    tracing::info!("Parsing metro data ...");
    let mut dataset = Dataset::new(DatasetKind::Metro, date);
    for state in &states {
        scrape_state_metros(session, config, state, &mut dataset).await?;
        tokio::time::sleep(config.next_page_delay).await;
    }
    tracing::info!("Parsing metro data finished ({} metros).", dataset.len());
    Ok(dataset)
}

async fn scrape_state_metros<S: PageSession>(
    session: &mut S,
    config: &ScrapeConfig,
    state: &JurisdictionRef,
    dataset: &mut Dataset,
) -> Result<(), AppError> {
    tracing::info!("Parsing {} metro data ...", state.name);
    let url = state
        .source_url
        .as_ref()
        .ok_or_else(|| ParseError::MissingElement(format!("link to the {} page", state.name)))?;

    let snapshot_name = format!("metros-{}", state.abbreviation);
    load_page(
        session,
        config,
        url.as_str(),
        &[METRO_EXPAND_SELECTOR, METRO_NAMES_SELECTOR, METRO_TABLES_SELECTOR],
        (DatasetKind::Metro, &snapshot_name),
    )
    .await?;
    session.click(METRO_EXPAND_SELECTOR).await?;

    let document = session.current_page()?.document();
    let metros = table::parse_metro_prices(&document, state)?;
    for metro in &metros {
        dataset.push(PriceRecord::assemble(
            &metro.metro.parent,
            Some(&metro.metro.name),
            &metro.grades,
            &metro.prices,
            dataset.date,
        ));
    }
    tracing::info!("Parsing {} metro finished ({} metros).", state.name, metros.len());
    Ok(())
}
