// src/config.rs
use std::path::PathBuf;
use std::time::Duration;

// --- Source ---
pub const SOURCE_URL: &str = "https://gasprices.aaa.com/state-gas-price-averages/";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

// --- CSS selectors ---
pub const DATE_SELECTOR: &str = "div.average-price > span";
pub const STATE_HEADERS_SELECTOR: &str = "#sortable > thead > tr > th";
pub const STATE_ROWS_SELECTOR: &str = "#sortable > tbody > tr";
pub const METRO_EXPAND_SELECTOR: &str = "a.expand-all-js";
pub const METRO_NAMES_SELECTOR: &str = "div.accordion-prices > h3.ui-accordion-header";
pub const METRO_TABLES_SELECTOR: &str =
    "div.accordion-prices > div.ui-accordion-content > div.tblwrap > table.table-mob";

// --- Output columns ---
pub const COLUMN_STATE_NAME: &str = "State-Name";
pub const COLUMN_STATE_ABBREVIATION: &str = "State-Abbreviation";
pub const COLUMN_METRO_NAME: &str = "Metro-Name";
pub const COLUMN_CURRENCY: &str = "Currency";
pub const COLUMN_UNIT: &str = "Unit";
pub const COLUMN_DATE: &str = "Date";

pub const CURRENCY: &str = "U.S Dollar";
pub const UNIT: &str = "US Gallon";

// --- Defaults ---
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_NEXT_PAGE_DELAY_SECS: u64 = 2;
pub const READY_POLL_INTERVAL_MS: u64 = 100;

/// Everything one run needs to know, resolved from the command line.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub source_url: String,
    pub data_dir: PathBuf,
    pub wait_timeout: Duration,
    pub request_timeout: Duration, // whole HTTP exchange, separate from the readiness wait
    pub poll_interval: Duration,
    pub next_page_delay: Duration,
    pub user_agent: String,
    pub debug: bool,
}

impl ScrapeConfig {
    /// Where page snapshots go when `--debug` is on.
    pub fn debug_dir(&self) -> Option<PathBuf> {
        self.debug.then(|| self.data_dir.join("debug"))
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            source_url: SOURCE_URL.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            wait_timeout: Duration::from_secs(DEFAULT_WAIT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            poll_interval: Duration::from_millis(READY_POLL_INTERVAL_MS),
            next_page_delay: Duration::from_secs(DEFAULT_NEXT_PAGE_DELAY_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            debug: false,
        }
    }
}
