// src/main.rs
mod assemble;
mod browser;
mod config;
mod extractors;
mod pipeline;
mod storage;
mod utils;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use reqwest::Url;

use assemble::DatasetKind;
use browser::http::HttpSession;
use browser::SessionGuard;
use config::ScrapeConfig;
use storage::StorageManager;
use utils::AppError;

/// Scrapes AAA daily average gas prices into dated CSV files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Which dataset to scrape
    #[arg(value_enum)]
    kind: DatasetKind,

    /// Root directory for datasets (files land in <data-dir>/<kind>/<date>.csv)
    #[arg(short, long, default_value = config::DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Page listing the state averages
    #[arg(long, default_value = config::SOURCE_URL)]
    source_url: String,

    /// Seconds to wait for page content before giving up
    #[arg(long, default_value_t = config::DEFAULT_WAIT_TIMEOUT_SECS)]
    wait_timeout: u64,

    /// Seconds allowed for each HTTP request, separate from the content wait
    #[arg(long, default_value_t = config::DEFAULT_REQUEST_TIMEOUT_SECS)]
    request_timeout: u64,

    /// Seconds to pause between state pages (metro runs)
    #[arg(long, default_value_t = config::DEFAULT_NEXT_PAGE_DELAY_SECS)]
    next_page_delay: u64,

    /// User-Agent sent with every request
    #[arg(long, default_value = config::DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Debug mode - save annotated HTML snapshots of every fetched page
    #[arg(long)]
    debug: bool,
}

impl Args {
    fn into_config(self) -> Result<ScrapeConfig, AppError> {
        Url::parse(&self.source_url)
            .map_err(|e| AppError::Config(format!("Invalid source URL '{}': {}", self.source_url, e)))?;
        if self.request_timeout == 0 {
            return Err(AppError::Config("--request-timeout must be at least 1 second".to_string()));
        }
        if self.wait_timeout == 0 {
            return Err(AppError::Config("--wait-timeout must be at least 1 second".to_string()));
        }

        Ok(ScrapeConfig {
            source_url: self.source_url,
            data_dir: self.data_dir,
            wait_timeout: Duration::from_secs(self.wait_timeout),
            request_timeout: Duration::from_secs(self.request_timeout),
            next_page_delay: Duration::from_secs(self.next_page_delay),
            user_agent: self.user_agent,
            debug: self.debug,
            ..ScrapeConfig::default()
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();
    utils::logging::setup_logging(args.debug);
    tracing::info!("Start.");
    tracing::debug!("Args: {:?}", args);

    let kind = args.kind;
    let config = args.into_config()?;
    let storage = StorageManager::new(&config.data_dir)?;
    let today = chrono::Local::now().date_naive();

    let mut session = SessionGuard::new(HttpSession::open(&config)?);
    let path = pipeline::run(kind, &mut *session, &config, &storage, today).await?;
    session.close();

    tracing::info!("Done. {} written to {}", kind.dir_name(), path.display());
    Ok(())
}
