// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("HTTP error {status} for {url}")]
    Http { url: String, status: reqwest::StatusCode },

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Timed out after {waited_ms}ms waiting on {url} for: {}", .missing.join(", "))]
    Timeout {
        url: String,
        missing: Vec<String>,
        waited_ms: u128,
    },

    #[error("No element matches selector '{0}'")]
    ElementNotFound(String),

    #[error("No page has been loaded in this session")]
    NoPage,

    #[error("Page session is already closed")]
    SessionClosed,

    #[error(transparent)]
    Selector(#[from] ParseError),
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Invalid CSS selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Invalid price text '{text}'")]
    InvalidPrice { text: String },

    #[error("Missing element: {0}")]
    MissingElement(String),

    #[error("Invalid link '{href}': {reason}")]
    InvalidLink { href: String, reason: String },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Could not move dataset into place: {0}")]
    PersistError(#[from] tempfile::PersistError),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Page fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Parsing failed: {0}")]
    Parse(#[from] ParseError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
