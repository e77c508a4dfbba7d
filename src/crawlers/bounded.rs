use crate::config::CrawlSettings;
use crate::crawlers::crawler::{BrowserLauncher, BrowserPage};
use crate::error::{BrowserError, CrawlError};
use crate::filter::{CrawlTarget, UrlFilter, VisitedSet, discover_links};
use crate::parsers::{self, html};
use crate::results::CombinedText;
use crate::shutdown::Shutdown;
use std::sync::Arc;
use url::Url;

/// Single-hop crawler: the start page plus a bounded number of same-section links.
///
/// Every crawl gets its own browser session, closed before `crawl` returns.
pub struct BoundedCrawler {
    launcher: Arc<dyn BrowserLauncher>,
    settings: CrawlSettings,
    shutdown: Shutdown,
}

impl BoundedCrawler {
    pub fn new(launcher: Arc<dyn BrowserLauncher>, settings: CrawlSettings) -> Self {
        Self {
            launcher,
            settings,
            shutdown: Shutdown::never(),
        }
    }

    /// Cancel in-flight crawls when the process is asked to stop
    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn settings(&self) -> &CrawlSettings {
        &self.settings
    }

    /// Crawls `start_url` and returns the combined page text.
    ///
    /// If the crawl stops early after gathering some text, that text is
    /// returned with the interrupted marker instead of an error.
    pub async fn crawl(&self, start_url: &Url) -> Result<String, CrawlError> {
        ::log::info!("Starting crawl for: {}", start_url);
        let start_time = std::time::Instant::now();
        let target = CrawlTarget::new(start_url.clone());

        let mut page = self
            .launcher
            .launch(&self.settings)
            .await
            .map_err(|source| CrawlError {
                url: start_url.to_string(),
                source,
            })?;

        let mut combined = CombinedText::new();
        let mut shutdown = self.shutdown.clone();
        let outcome = tokio::select! {
            result = self.visit(page.as_mut(), &target, &mut combined) => result,
            _ = shutdown.wait() => Err(BrowserError::ShuttingDown),
        };

        if let Err(e) = page.close().await {
            ::log::warn!("Failed to close browser session: {}", e);
        }

        ::log::info!(
            "Crawl of {} finished with {} pages in {:.2} seconds",
            start_url,
            combined.pages(),
            start_time.elapsed().as_secs_f64()
        );

        match outcome {
            Ok(()) => Ok(combined.into_string()),
            Err(e) if !combined.is_empty() => {
                ::log::warn!("Crawl of {} interrupted: {}", start_url, e);
                Ok(combined.into_interrupted())
            }
            Err(source) => Err(CrawlError {
                url: start_url.to_string(),
                source,
            }),
        }
    }

    async fn visit(
        &self,
        page: &mut dyn BrowserPage,
        target: &CrawlTarget,
        combined: &mut CombinedText,
    ) -> Result<(), BrowserError> {
        let timeout = self.settings.navigation_timeout();
        let mut visited = VisitedSet::default();
        visited.insert(target.start_url());

        let final_url = page.navigate(target.start_url(), timeout).await?;
        visited.insert(&final_url);

        let text = parsers::extract_page_text(page).await;
        combined.push_page(&text);

        let hrefs = html::extract_links(&page.content().await?);
        let filter = UrlFilter::for_target(target);
        let queue = discover_links(&final_url, &hrefs, &filter, &mut visited);
        ::log::info!(
            "Found {} links on {}, {} in scope",
            hrefs.len(),
            final_url,
            queue.len()
        );

        for link in queue.iter().take(self.settings.max_linked_pages) {
            match page.navigate(link, timeout).await {
                Ok(_) => {
                    let text = parsers::extract_page_text(page).await;
                    combined.push_page(&text);
                }
                Err(e) => {
                    ::log::warn!("Skipping {}: {}", link, e);
                }
            }
        }

        Ok(())
    }
}
