// src/browser/fixture.rs
//! In-memory page session for tests.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use reqwest::Url;

use crate::browser::{Page, PageSession, ReadyState};
use crate::extractors::parse_selector;
use crate::utils::error::FetchError;

#[derive(Default)]
pub struct FixtureSession {
    pages: HashMap<String, String>,
    page: Option<Page>,
    loading_polls: usize,
    remaining_polls: Cell<usize>,
    closed: Rc<Cell<bool>>,
    pub visited: Vec<String>,
    pub clicked: Vec<String>,
}

impl FixtureSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    /// Report `Loading` for the first `polls` ready-state checks after each navigation.
    pub fn loading_for(mut self, polls: usize) -> Self {
        self.loading_polls = polls;
        self
    }

    pub fn closed_flag(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.closed)
    }
}

impl PageSession for FixtureSession {
    async fn navigate(&mut self, url: &str) -> Result<(), FetchError> {
        if self.closed.get() {
            return Err(FetchError::SessionClosed);
        }
        self.visited.push(url.to_string());
        let html = self.pages.get(url).ok_or_else(|| FetchError::Http {
            url: url.to_string(),
            status: reqwest::StatusCode::NOT_FOUND,
        })?;
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        self.page = Some(Page::new(parsed, html.clone()));
        self.remaining_polls.set(self.loading_polls);
        Ok(())
    }

    fn ready_state(&self) -> ReadyState {
        match (&self.page, self.remaining_polls.get()) {
            (None, _) => ReadyState::Uninitialized,
            (Some(_), 0) => ReadyState::Complete,
            (Some(_), n) => {
                self.remaining_polls.set(n - 1);
                ReadyState::Loading
            }
        }
    }

    fn current_page(&self) -> Result<&Page, FetchError> {
        self.page.as_ref().ok_or(FetchError::NoPage)
    }

    async fn click(&mut self, selector: &str) -> Result<(), FetchError> {
        let target = parse_selector(selector)?;
        if self.current_page()?.document().select(&target).next().is_none() {
            return Err(FetchError::ElementNotFound(selector.to_string()));
        }
        self.clicked.push(selector.to_string());
        Ok(())
    }

    fn close(&mut self) {
        self.page = None;
        self.closed.set(true);
    }

    fn is_closed(&self) -> bool {
        self.closed.get()
    }
}
