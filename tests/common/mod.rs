//! Scripted browser and language-model fakes shared by the integration tests

use async_trait::async_trait;
use doc_summary::config::CrawlSettings;
use doc_summary::crawlers::{BoundedCrawler, BrowserLauncher, BrowserPage};
use doc_summary::error::{BrowserError, ModelError};
use doc_summary::summarizer::{LanguageModel, ModelResponse};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

/// Wraps body markup in a minimal HTML document
#[allow(dead_code)]
pub fn html_page(body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><title>Docs</title></head><body>{}</body></html>",
        body
    )
}

/// What the fake browser observed during a crawl
#[derive(Debug, Default)]
pub struct BrowserLog {
    pub launches: usize,
    pub navigations: Vec<String>,
    pub closes: usize,
}

/// A scripted site served by the fake browser
#[derive(Debug, Default, Clone)]
pub struct FakeSite {
    pages: HashMap<String, String>,
    redirects: HashMap<String, String>,
    failing: HashSet<String>,
    hanging: HashSet<String>,
    content_fails_from: Option<usize>,
    launch_fails: bool,
}

#[allow(dead_code)]
impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), html.into());
        self
    }

    pub fn redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(from.to_string(), to.to_string());
        self
    }

    /// Navigation to `url` fails
    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    /// Navigation to `url` never completes
    pub fn hanging(mut self, url: &str) -> Self {
        self.hanging.insert(url.to_string());
        self
    }

    /// Content snapshots fail from the `n`th call on (zero-based)
    pub fn content_fails_from(mut self, n: usize) -> Self {
        self.content_fails_from = Some(n);
        self
    }

    pub fn launch_fails(mut self) -> Self {
        self.launch_fails = true;
        self
    }
}

/// Launches [`FakePage`]s over a [`FakeSite`]
pub struct FakeLauncher {
    site: Arc<FakeSite>,
    log: Arc<Mutex<BrowserLog>>,
}

#[allow(dead_code)]
impl FakeLauncher {
    pub fn new(site: FakeSite) -> Arc<Self> {
        Arc::new(Self {
            site: Arc::new(site),
            log: Arc::new(Mutex::new(BrowserLog::default())),
        })
    }

    pub fn navigations(&self) -> Vec<String> {
        self.log.lock().unwrap().navigations.clone()
    }

    pub fn closes(&self) -> usize {
        self.log.lock().unwrap().closes
    }

    pub fn launches(&self) -> usize {
        self.log.lock().unwrap().launches
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(
        &self,
        _settings: &CrawlSettings,
    ) -> Result<Box<dyn BrowserPage>, BrowserError> {
        if self.site.launch_fails {
            return Err(BrowserError::Connect {
                url: "http://localhost:4444".to_string(),
                message: "connection refused".to_string(),
            });
        }

        self.log.lock().unwrap().launches += 1;
        Ok(Box::new(FakePage {
            site: self.site.clone(),
            log: self.log.clone(),
            current: None,
            content_calls: 0,
            closed: false,
        }))
    }
}

pub struct FakePage {
    site: Arc<FakeSite>,
    log: Arc<Mutex<BrowserLog>>,
    current: Option<String>,
    content_calls: usize,
    closed: bool,
}

#[async_trait]
impl BrowserPage for FakePage {
    async fn navigate(&mut self, url: &Url, _timeout: Duration) -> Result<Url, BrowserError> {
        let requested = url.to_string();
        self.log.lock().unwrap().navigations.push(requested.clone());

        if self.site.hanging.contains(&requested) {
            std::future::pending::<()>().await;
        }
        if self.site.failing.contains(&requested) {
            return Err(BrowserError::Navigation {
                url: requested,
                message: "net::ERR_CONNECTION_RESET".to_string(),
            });
        }

        let landed = self
            .site
            .redirects
            .get(&requested)
            .cloned()
            .unwrap_or(requested);
        self.current = Some(landed.clone());
        Url::parse(&landed).map_err(|e| BrowserError::Command(e.to_string()))
    }

    async fn content(&mut self) -> Result<String, BrowserError> {
        let call = self.content_calls;
        self.content_calls += 1;
        if self.site.content_fails_from.is_some_and(|n| call >= n) {
            return Err(BrowserError::Command("page crashed".to_string()));
        }

        let html = self
            .current
            .as_ref()
            .and_then(|url| self.site.pages.get(url))
            .cloned()
            .unwrap_or_else(|| html_page(""));
        Ok(html)
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        if !self.closed {
            self.closed = true;
            self.log.lock().unwrap().closes += 1;
        }
        Ok(())
    }
}

/// Crawler over a fake site with default settings
#[allow(dead_code)]
pub fn crawler_for(launcher: &Arc<FakeLauncher>) -> BoundedCrawler {
    BoundedCrawler::new(launcher.clone(), CrawlSettings::default())
}

/// Language model that answers with a fixed reply and records prompts
#[allow(dead_code)]
pub struct FakeModel {
    reply: ModelResponse,
    hangs: bool,
    prompts: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FakeModel {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: ModelResponse {
                text: Some(text.to_string()),
                finish_reason: Some("STOP".to_string()),
                block_reason: None,
            },
            hangs: false,
            prompts: Mutex::new(Vec::new()),
        })
    }

    /// A model whose calls never complete
    pub fn hanging() -> Arc<Self> {
        Arc::new(Self {
            reply: ModelResponse::default(),
            hangs: true,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for FakeModel {
    async fn generate(&self, prompt: &str) -> Result<ModelResponse, ModelError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.hangs {
            std::future::pending::<()>().await;
        }
        Ok(self.reply.clone())
    }
}
