// src/browser/http.rs
use std::time::Duration;

use reqwest::{header, Url};

use crate::browser::{Page, PageSession, ReadyState};
use crate::config::ScrapeConfig;
use crate::extractors::parse_selector;
use crate::utils::error::FetchError;

/// Page session over plain HTTP. A document is `Complete` once its body has
/// been received; the served markup already contains the accordion content,
/// so clicks only need to find their target.
pub struct HttpSession {
    client: reqwest::Client,
    request_timeout: Duration,
    page: Option<Page>,
    state: ReadyState,
    closed: bool,
}

impl HttpSession {
    /// Creates a reqwest client configured for the price pages.
    pub fn open(config: &ScrapeConfig) -> Result<Self, FetchError> {
        tracing::info!("Preparing page session ...");
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .connect_timeout(config.request_timeout)
            .build()?;
        tracing::debug!("Using User-Agent: {}", config.user_agent);

        Ok(Self {
            client,
            request_timeout: config.request_timeout,
            page: None,
            state: ReadyState::Uninitialized,
            closed: false,
        })
    }
}

impl PageSession for HttpSession {
    async fn navigate(&mut self, url: &str) -> Result<(), FetchError> {
        if self.closed {
            return Err(FetchError::SessionClosed);
        }
        let target = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        tracing::info!("Requesting page {} ...", target);
        self.page = None;
        self.state = ReadyState::Loading;

        let response = self
            .client
            .get(target)
            .header(header::ACCEPT, "text/html,application/xhtml+xml,*/*")
            .timeout(self.request_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("HTTP error status: {} for URL: {}", status, url);
            self.state = ReadyState::Uninitialized;
            return Err(FetchError::Http {
                url: url.to_string(),
                status,
            });
        }

        let final_url = response.url().clone();
        let body = response.text().await?;
        tracing::debug!("Received {} bytes from {}", body.len(), final_url);

        self.page = Some(Page::new(final_url, body));
        self.state = ReadyState::Complete;
        Ok(())
    }

    fn ready_state(&self) -> ReadyState {
        self.state
    }

    fn current_page(&self) -> Result<&Page, FetchError> {
        self.page.as_ref().ok_or(FetchError::NoPage)
    }

    async fn click(&mut self, selector: &str) -> Result<(), FetchError> {
        if self.closed {
            return Err(FetchError::SessionClosed);
        }
        let target = parse_selector(selector)?;
        let found = self.current_page()?.document().select(&target).next().is_some();
        if !found {
            return Err(FetchError::ElementNotFound(selector.to_string()));
        }
        tracing::debug!("Clicked '{}'", selector);
        Ok(())
    }

    fn close(&mut self) {
        if !self.closed {
            self.page = None;
            self.state = ReadyState::Uninitialized;
            self.closed = true;
            tracing::debug!("HTTP page session closed.");
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_closed_session_refuses_navigation() {
        let mut session = HttpSession::open(&ScrapeConfig::default()).unwrap();
        session.close();
        assert!(session.is_closed());

        let err = session.navigate("https://example.test/").await.unwrap_err();
        assert!(matches!(err, FetchError::SessionClosed));
    }

    #[test]
    fn test_request_timeout_is_not_the_readiness_wait() {
        let config = ScrapeConfig {
            wait_timeout: Duration::from_secs(1),
            request_timeout: Duration::from_secs(45),
            ..ScrapeConfig::default()
        };
        let session = HttpSession::open(&config).unwrap();
        assert_eq!(session.request_timeout, Duration::from_secs(45));
        assert_ne!(ScrapeConfig::default().request_timeout, ScrapeConfig::default().wait_timeout);
    }

    #[tokio::test]
    async fn test_invalid_url_is_rejected_before_request() {
        let mut session = HttpSession::open(&ScrapeConfig::default()).unwrap();
        let err = session.navigate("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
        assert_eq!(session.ready_state(), ReadyState::Uninitialized);
    }

    #[tokio::test]
    async fn test_click_without_page() {
        let mut session = HttpSession::open(&ScrapeConfig::default()).unwrap();
        let err = session.click("a.expand-all-js").await.unwrap_err();
        assert!(matches!(err, FetchError::NoPage));
    }
}
