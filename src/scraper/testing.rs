//! Scripted browser for tests: a fixed map of URL → HTML.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::browser::{Automation, BrowserContext, BrowserPage, BrowserSession, ContextOptions};
use crate::error::ScrapeError;

pub const CLUB_SLUG: &str = "dudley-redhead-junior-rlfc-inc-12074";

/// Competition page with one table row per text block
pub fn competition_html(grade: &str, rows: &[&str]) -> String {
    let rows: String = rows
        .iter()
        .map(|row| format!("<tr><td>{}</td></tr>", row))
        .collect();
    format!(
        "<html><head><title>{grade} | Play Rugby League</title></head>\
         <body><h1>{grade}</h1><table>{rows}</table></body></html>"
    )
}

#[derive(Debug, Default)]
struct Events {
    connects: usize,
    visited: Vec<String>,
    open_sessions: usize,
    open_contexts: usize,
}

/// `None` pages fail to load
type Pages = Arc<HashMap<String, Option<String>>>;

#[derive(Default)]
pub struct FakeAutomation {
    pages: HashMap<String, Option<String>>,
    refuse: bool,
    events: Arc<Mutex<Events>>,
}

impl FakeAutomation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), Some(html.to_string()));
        self
    }

    pub fn failing_page(mut self, url: &str) -> Self {
        self.pages.insert(url.to_string(), None);
        self
    }

    pub fn refuse_connections(mut self) -> Self {
        self.refuse = true;
        self
    }

    pub fn connects(&self) -> usize {
        self.events.lock().unwrap().connects
    }

    /// Every URL passed to `goto`, in order
    pub fn visited(&self) -> Vec<String> {
        self.events.lock().unwrap().visited.clone()
    }

    pub fn all_closed(&self) -> bool {
        let events = self.events.lock().unwrap();
        events.open_sessions == 0 && events.open_contexts == 0
    }
}

#[async_trait]
impl Automation for FakeAutomation {
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn BrowserSession>, ScrapeError> {
        let mut events = self.events.lock().unwrap();
        events.connects += 1;
        if self.refuse {
            return Err(ScrapeError::Connection(format!("{endpoint}: connection refused")));
        }
        events.open_sessions += 1;
        Ok(Box::new(FakeSession {
            pages: Arc::new(self.pages.clone()),
            events: Arc::clone(&self.events),
            closed: false,
        }))
    }
}

struct FakeSession {
    pages: Pages,
    events: Arc<Mutex<Events>>,
    closed: bool,
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn new_context(
        &mut self,
        _options: &ContextOptions,
    ) -> Result<Box<dyn BrowserContext>, ScrapeError> {
        self.events.lock().unwrap().open_contexts += 1;
        Ok(Box::new(FakeContext {
            pages: Arc::clone(&self.pages),
            events: Arc::clone(&self.events),
            closed: false,
        }))
    }

    async fn close(&mut self) -> Result<(), ScrapeError> {
        if !self.closed {
            self.closed = true;
            self.events.lock().unwrap().open_sessions -= 1;
        }
        Ok(())
    }
}

struct FakeContext {
    pages: Pages,
    events: Arc<Mutex<Events>>,
    closed: bool,
}

#[async_trait]
impl BrowserContext for FakeContext {
    async fn new_page(&mut self) -> Result<Box<dyn BrowserPage>, ScrapeError> {
        Ok(Box::new(FakePage {
            pages: Arc::clone(&self.pages),
            events: Arc::clone(&self.events),
            current: None,
        }))
    }

    async fn close(&mut self) -> Result<(), ScrapeError> {
        if !self.closed {
            self.closed = true;
            self.events.lock().unwrap().open_contexts -= 1;
        }
        Ok(())
    }
}

struct FakePage {
    pages: Pages,
    events: Arc<Mutex<Events>>,
    current: Option<String>,
}

#[async_trait]
impl BrowserPage for FakePage {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), ScrapeError> {
        self.events.lock().unwrap().visited.push(url.to_string());
        match self.pages.get(url) {
            Some(Some(html)) => {
                self.current = Some(html.clone());
                Ok(())
            }
            Some(None) => Err(ScrapeError::NavigationTimeout {
                url: url.to_string(),
                timeout,
            }),
            None => Err(ScrapeError::Navigation {
                url: url.to_string(),
                message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            }),
        }
    }

    async fn content(&mut self) -> Result<String, ScrapeError> {
        self.current.clone().ok_or_else(|| ScrapeError::PageExtraction {
            url: "about:blank".to_string(),
            message: "nothing loaded".to_string(),
        })
    }
}
