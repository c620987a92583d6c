//! Browser automation seam and its chromiumoxide implementation.
//!
//! The crawler only sees the traits below. [`Chromium`] connects to a remote
//! DevTools websocket (Browserless or a local `--remote-debugging-port`).

use async_trait::async_trait;
use chromiumoxide::browser::Browser as ChromeBrowser;
use chromiumoxide::cdp::browser_protocol::emulation::SetTimezoneOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::dom;
use crate::error::ScrapeError;

/// One element from a rendered page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomNode {
    /// Upper-case tag name, e.g. `DIV`
    pub tag_name: String,
    /// Whitespace-collapsed text content
    pub text: String,
    /// Raw `href` attribute, if any
    pub href: Option<String>,
}

/// Per-context browser options
#[derive(Debug, Clone)]
pub struct ContextOptions {
    /// IANA timezone, e.g. `Australia/Sydney`
    pub timezone: String,
    pub user_agent: Option<String>,
}

/// Entry point: something that can open browser sessions
#[async_trait]
pub trait Automation: Send + Sync {
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn BrowserSession>, ScrapeError>;
}

#[async_trait]
pub trait BrowserSession: Send {
    async fn new_context(
        &mut self,
        options: &ContextOptions,
    ) -> Result<Box<dyn BrowserContext>, ScrapeError>;

    /// Idempotent
    async fn close(&mut self) -> Result<(), ScrapeError>;
}

#[async_trait]
pub trait BrowserContext: Send {
    async fn new_page(&mut self) -> Result<Box<dyn BrowserPage>, ScrapeError>;

    /// Idempotent
    async fn close(&mut self) -> Result<(), ScrapeError>;
}

/// A tab. DOM queries run over the rendered HTML.
#[async_trait]
pub trait BrowserPage: Send {
    /// Navigate and wait for the load, bounded by `timeout`
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), ScrapeError>;

    /// Current rendered HTML
    async fn content(&mut self) -> Result<String, ScrapeError>;

    async fn query_all(&mut self, selector: &str) -> Result<Vec<DomNode>, ScrapeError> {
        let html = self.content().await?;
        dom::query_all(&html, selector)
    }

    async fn title(&mut self) -> Result<Option<String>, ScrapeError> {
        let html = self.content().await?;
        Ok(dom::title(&html))
    }

    async fn first_heading(&mut self) -> Result<Option<String>, ScrapeError> {
        let html = self.content().await?;
        Ok(dom::first_heading(&html))
    }
}

/// Remote Chromium over the DevTools protocol
#[derive(Debug, Default, Clone, Copy)]
pub struct Chromium;

#[async_trait]
impl Automation for Chromium {
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn BrowserSession>, ScrapeError> {
        let (browser, mut handler) = ChromeBrowser::connect(endpoint)
            .await
            .map_err(|e| ScrapeError::Connection(e.to_string()))?;

        // Handler must keep running for the browser to work
        let handle = tokio::spawn(async move {
            loop {
                match handler.next().await {
                    Some(Ok(_)) => continue,
                    Some(Err(_)) => continue,
                    None => break,
                }
            }
        });

        Ok(Box::new(ChromiumSession {
            browser: Arc::new(Mutex::new(browser)),
            handle: Some(handle),
        }))
    }
}

struct ChromiumSession {
    browser: Arc<Mutex<ChromeBrowser>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn new_context(
        &mut self,
        options: &ContextOptions,
    ) -> Result<Box<dyn BrowserContext>, ScrapeError> {
        let created = self
            .browser
            .lock()
            .await
            .execute(CreateBrowserContextParams::default())
            .await
            .map_err(ScrapeError::browser)?;

        Ok(Box::new(ChromiumContext {
            browser: Arc::clone(&self.browser),
            id: Some(created.result.browser_context_id),
            options: options.clone(),
        }))
    }

    async fn close(&mut self) -> Result<(), ScrapeError> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        let closed = self.browser.lock().await.close().await;
        handle.abort();
        closed.map(|_| ()).map_err(ScrapeError::browser)
    }
}

struct ChromiumContext {
    browser: Arc<Mutex<ChromeBrowser>>,
    id: Option<BrowserContextId>,
    options: ContextOptions,
}

#[async_trait]
impl BrowserContext for ChromiumContext {
    async fn new_page(&mut self) -> Result<Box<dyn BrowserPage>, ScrapeError> {
        let id = self
            .id
            .clone()
            .ok_or_else(|| ScrapeError::Browser("browser context already closed".to_string()))?;
        let params = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(id)
            .build()
            .map_err(ScrapeError::Browser)?;

        let page = self
            .browser
            .lock()
            .await
            .new_page(params)
            .await
            .map_err(ScrapeError::browser)?;

        page.execute(SetTimezoneOverrideParams::new(self.options.timezone.clone()))
            .await
            .map_err(ScrapeError::browser)?;
        if let Some(ref user_agent) = self.options.user_agent {
            page.execute(SetUserAgentOverrideParams::new(user_agent.clone()))
                .await
                .map_err(ScrapeError::browser)?;
        }

        Ok(Box::new(ChromiumPage { page }))
    }

    async fn close(&mut self) -> Result<(), ScrapeError> {
        let Some(id) = self.id.take() else {
            return Ok(());
        };
        self.browser
            .lock()
            .await
            .execute(DisposeBrowserContextParams::new(id))
            .await
            .map(|_| ())
            .map_err(ScrapeError::browser)
    }
}

struct ChromiumPage {
    page: Page,
}

#[async_trait]
impl BrowserPage for ChromiumPage {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), ScrapeError> {
        match tokio::time::timeout(timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(ScrapeError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            }),
            Err(_) => Err(ScrapeError::NavigationTimeout {
                url: url.to_string(),
                timeout,
            }),
        }
    }

    async fn content(&mut self) -> Result<String, ScrapeError> {
        match self.page.content().await {
            Ok(html) => Ok(html),
            Err(e) => Err(ScrapeError::PageExtraction {
                url: self.page.url().await.ok().flatten().unwrap_or_default(),
                message: e.to_string(),
            }),
        }
    }
}
