use crate::config::{CrawlSettings, ServerConfig};
use crate::crawlers::crawler::{BrowserLauncher, BrowserPage};
use crate::error::BrowserError;
use async_trait::async_trait;
use fantoccini::error::{CmdError, NewSessionError};
use fantoccini::{Client, ClientBuilder};
use serde_json::{Map, Value, json};
use std::time::Duration;
use url::Url;

/// Launches browser sessions on a WebDriver server (ChromeDriver, geckodriver, Selenium)
#[derive(Debug, Clone)]
pub struct WebDriverLauncher {
    webdriver_url: String,
    fallback_urls: Vec<String>,
}

impl WebDriverLauncher {
    pub fn new(webdriver_url: impl Into<String>) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
            fallback_urls: Vec::new(),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(&config.webdriver_url).with_fallbacks(config.fallback_webdriver_urls.clone())
    }

    /// Endpoints tried in order when the primary one refuses a session
    pub fn with_fallbacks(mut self, fallback_urls: Vec<String>) -> Self {
        self.fallback_urls = fallback_urls;
        self
    }

    async fn connect(&self, settings: &CrawlSettings) -> Result<Client, BrowserError> {
        let capabilities = session_capabilities(settings);

        let primary_error = match connect_to(&self.webdriver_url, capabilities.clone()).await {
            Ok(client) => {
                ::log::debug!("Connected to WebDriver at {}", self.webdriver_url);
                return Ok(client);
            }
            Err(e) => {
                ::log::error!(
                    "Failed to connect to WebDriver at {}: {}",
                    self.webdriver_url,
                    e
                );
                e.to_string()
            }
        };

        for url in &self.fallback_urls {
            if *url == self.webdriver_url {
                continue;
            }

            ::log::info!("Trying fallback WebDriver URL: {}", url);
            if let Ok(client) = connect_to(url, capabilities.clone()).await {
                ::log::debug!("Connected to fallback WebDriver at {}", url);
                return Ok(client);
            }
        }

        ::log::error!(
            "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
        );
        Err(BrowserError::Connect {
            url: self.webdriver_url.clone(),
            message: primary_error,
        })
    }
}

async fn connect_to(
    url: &str,
    capabilities: Map<String, Value>,
) -> Result<Client, NewSessionError> {
    let mut builder = ClientBuilder::native();
    builder.capabilities(capabilities);
    builder.connect(url).await
}

/// New-session capabilities: headless, page-load wait, desktop user-agent
pub fn session_capabilities(settings: &CrawlSettings) -> Map<String, Value> {
    let mut chrome_args = vec![
        format!("--user-agent={}", settings.user_agent),
        "--disable-gpu".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--no-sandbox".to_string(),
    ];
    let mut firefox_args: Vec<String> = Vec::new();
    if settings.headless {
        chrome_args.push("--headless=new".to_string());
        firefox_args.push("-headless".to_string());
    }

    let mut capabilities = Map::new();
    capabilities.insert("pageLoadStrategy".to_string(), json!("normal"));
    capabilities.insert(
        "timeouts".to_string(),
        json!({ "pageLoad": settings.navigation_timeout_secs * 1000 }),
    );
    capabilities.insert(
        "goog:chromeOptions".to_string(),
        json!({ "args": chrome_args }),
    );
    capabilities.insert(
        "moz:firefoxOptions".to_string(),
        json!({
            "args": firefox_args,
            "prefs": { "general.useragent.override": settings.user_agent },
        }),
    );
    capabilities
}

#[async_trait]
impl BrowserLauncher for WebDriverLauncher {
    async fn launch(&self, settings: &CrawlSettings) -> Result<Box<dyn BrowserPage>, BrowserError> {
        let client = self.connect(settings).await?;
        Ok(Box::new(WebDriverPage {
            client: Some(client),
        }))
    }
}

/// The single page of a WebDriver session
pub struct WebDriverPage {
    client: Option<Client>,
}

impl WebDriverPage {
    fn client(&self) -> Result<&Client, BrowserError> {
        self.client
            .as_ref()
            .ok_or_else(|| BrowserError::Command("browser session already closed".to_string()))
    }
}

#[async_trait]
impl BrowserPage for WebDriverPage {
    async fn navigate(&mut self, url: &Url, timeout: Duration) -> Result<Url, BrowserError> {
        let client = self.client()?;
        ::log::debug!("Navigating to {}", url);

        match tokio::time::timeout(timeout, client.goto(url.as_str())).await {
            Err(_) => Err(BrowserError::Timeout {
                url: url.to_string(),
                secs: timeout.as_secs(),
            }),
            Ok(Err(e)) => Err(navigation_error(e, "accessing", url)),
            Ok(Ok(())) => client
                .current_url()
                .await
                .map_err(|e| navigation_error(e, "reading final URL of", url)),
        }
    }

    async fn content(&mut self) -> Result<String, BrowserError> {
        self.client()?
            .source()
            .await
            .map_err(|e| BrowserError::Command(format!("getting page source: {}", e)))
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        if let Some(client) = self.client.take() {
            client
                .close()
                .await
                .map_err(|e| BrowserError::Command(format!("closing session: {}", e)))?;
            ::log::debug!("Browser session closed");
        }
        Ok(())
    }
}

impl Drop for WebDriverPage {
    fn drop(&mut self) {
        // Sessions outlive the client handle on the server side
        if let Some(client) = self.client.take() {
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                handle.spawn(async move {
                    if let Err(e) = client.close().await {
                        ::log::warn!("Failed to close abandoned browser session: {}", e);
                    }
                });
            }
        }
    }
}

/// Maps a WebDriver command error, logging lost sessions separately
fn navigation_error(error: CmdError, context: &str, url: &Url) -> BrowserError {
    let message = error.to_string();
    if message.contains("Unable to find session") || message.contains("invalid session id") {
        ::log::warn!("Lost browser session while {} {}", context, url);
    } else {
        ::log::error!("Failed {} {}: {}", context, url, message);
    }
    BrowserError::Navigation {
        url: url.to_string(),
        message,
    }
}
