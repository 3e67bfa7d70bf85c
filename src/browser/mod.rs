// src/browser/mod.rs
//! Page sessions: something that can load a URL, report when the document is
//! ready, expose the current DOM and click on things.
//!
//! The scrape pipeline only ever talks to [`PageSession`]; [`http::HttpSession`]
//! is the production transport.

pub mod http;
#[cfg(test)]
pub mod fixture;

use std::ops::{Deref, DerefMut};
use std::time::Duration;

use reqwest::Url;
use scraper::{Html, Selector};
use tokio::time::Instant;

use crate::extractors::parse_selector;
use crate::utils::error::FetchError;

/// Mirrors `document.readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Uninitialized,
    Loading,
    Complete,
}

/// A loaded document and the URL it was finally served from.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: Url,
    pub html: String,
}

impl Page {
    pub fn new(url: Url, html: String) -> Self {
        Self { url, html }
    }

    /// Parses the page. `Html` is not cheap; callers parse once per step.
    pub fn document(&self) -> Html {
        Html::parse_document(&self.html)
    }

    /// Names of the selectors that currently match nothing.
    pub fn missing_selectors(&self, required: &[(String, Selector)]) -> Vec<String> {
        let document = self.document();
        required
            .iter()
            .filter(|(_, selector)| document.select(selector).next().is_none())
            .map(|(name, _)| name.clone())
            .collect()
    }
}

/// One exclusively owned page session, driven sequentially.
pub trait PageSession {
    /// Loads `url`, replacing the current page.
    async fn navigate(&mut self, url: &str) -> Result<(), FetchError>;

    fn ready_state(&self) -> ReadyState;

    fn current_page(&self) -> Result<&Page, FetchError>;

    /// Clicks the first element matching `selector`.
    async fn click(&mut self, selector: &str) -> Result<(), FetchError>;

    /// Releases the session. Must be idempotent.
    fn close(&mut self);

    fn is_closed(&self) -> bool;
}

/// Scoped ownership of a session: it is closed when the guard goes away,
/// whichever way the run ends.
pub struct SessionGuard<S: PageSession> {
    session: S,
}

impl<S: PageSession> SessionGuard<S> {
    pub fn new(session: S) -> Self {
        Self { session }
    }

    /// Orderly shutdown on the success path.
    pub fn close(mut self) {
        tracing::info!("Closing page session ...");
        self.session.close();
    }
}

impl<S: PageSession> Deref for SessionGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.session
    }
}

impl<S: PageSession> DerefMut for SessionGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.session
    }
}

impl<S: PageSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        if !self.session.is_closed() {
            tracing::warn!("Page session dropped while open, closing it now.");
            self.session.close();
        }
    }
}

/// Blocks until the document is complete and every selector (plus `body`)
/// matches at least one element, polling every `poll` up to `timeout`.
pub async fn wait_until_ready<S: PageSession>(
    session: &S,
    selectors: &[&str],
    timeout: Duration,
    poll: Duration,
) -> Result<(), FetchError> {
    let mut required: Vec<(String, Selector)> = Vec::with_capacity(selectors.len() + 1);
    for name in std::iter::once(&"body").chain(selectors) {
        if required.iter().any(|(seen, _)| seen == name) {
            continue;
        }
        required.push((name.to_string(), parse_selector(name)?));
    }

    tracing::info!("Waiting for document to be ready ...");
    let started = Instant::now();
    loop {
        let missing = match session.ready_state() {
            ReadyState::Complete => session.current_page()?.missing_selectors(&required),
            state => {
                tracing::debug!("Waiting for document ready state ({:?}) ...", state);
                required.iter().map(|(name, _)| name.clone()).collect()
            }
        };

        if missing.is_empty() {
            tracing::debug!("Document ready after {:?}", started.elapsed());
            return Ok(());
        }

        if started.elapsed() >= timeout {
            let url = session
                .current_page()
                .map(|page| page.url.to_string())
                .unwrap_or_default();
            return Err(FetchError::Timeout {
                url,
                missing,
                waited_ms: started.elapsed().as_millis(),
            });
        }

        tracing::trace!("Still missing: {:?}", missing);
        tokio::time::sleep(poll).await;
    }
}

#[cfg(test)]
mod tests {
    use super::fixture::FixtureSession;
    use super::*;

    const FAST: Duration = Duration::from_millis(1);

    #[tokio::test]
    async fn test_wait_succeeds_once_elements_present() {
        let mut session = FixtureSession::new()
            .with_page("https://example.test/", "<html><body><div class=\"x\">hi</div></body></html>");
        session.navigate("https://example.test/").await.unwrap();

        let result = wait_until_ready(&session, &["div.x"], Duration::from_millis(50), FAST).await;
        tokio_test::assert_ok!(result);
    }

    #[tokio::test]
    async fn test_wait_polls_through_loading_state() {
        let mut session = FixtureSession::new()
            .with_page("https://example.test/", "<html><body><p>ok</p></body></html>")
            .loading_for(3);
        session.navigate("https://example.test/").await.unwrap();

        wait_until_ready(&session, &["p"], Duration::from_secs(1), FAST).await.unwrap();
        assert_eq!(session.ready_state(), ReadyState::Complete);
    }

    #[tokio::test]
    async fn test_wait_times_out_naming_missing_selectors() {
        let mut session = FixtureSession::new()
            .with_page("https://example.test/", "<html><body><p>ok</p></body></html>");
        session.navigate("https://example.test/").await.unwrap();

        let err = wait_until_ready(&session, &["p", "table#gone", "span.nope"], Duration::from_millis(5), FAST)
            .await
            .unwrap_err();

        match err {
            FetchError::Timeout { url, missing, .. } => {
                assert_eq!(url, "https://example.test/");
                assert_eq!(missing, vec!["table#gone".to_string(), "span.nope".to_string()]);
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_wait_rejects_invalid_selector() {
        let mut session = FixtureSession::new().with_page("https://example.test/", "<body></body>");
        session.navigate("https://example.test/").await.unwrap();

        let result = wait_until_ready(&session, &["td[[["], Duration::from_millis(5), FAST).await;
        assert!(matches!(result, Err(FetchError::Selector(_))));
    }

    #[test]
    fn test_guard_closes_session_on_drop() {
        let session = FixtureSession::new();
        let closed = session.closed_flag();
        {
            let _guard = SessionGuard::new(session);
            assert!(!closed.get());
        }
        assert!(closed.get());
    }

    #[test]
    fn test_guard_explicit_close() {
        let session = FixtureSession::new();
        let closed = session.closed_flag();
        let guard = SessionGuard::new(session);
        guard.close();
        assert!(closed.get());
    }
}
