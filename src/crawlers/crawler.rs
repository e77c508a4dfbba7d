use crate::config::CrawlSettings;
use crate::error::BrowserError;
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// Starts isolated browser sessions, one per crawl
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Launch a fresh headless session with a single open page
    async fn launch(&self, settings: &CrawlSettings) -> Result<Box<dyn BrowserPage>, BrowserError>;
}

/// The single page (tab) of a browser session
#[async_trait]
pub trait BrowserPage: Send {
    /// Navigate and wait for the page load, returning the post-redirect URL
    async fn navigate(&mut self, url: &Url, timeout: Duration) -> Result<Url, BrowserError>;

    /// Snapshot of the currently rendered DOM as HTML
    async fn content(&mut self) -> Result<String, BrowserError>;

    /// End the session. Calling it again is a no-op.
    async fn close(&mut self) -> Result<(), BrowserError>;
}
