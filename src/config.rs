use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Top-level configuration for the tool server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// WebDriver endpoints tried when `webdriver_url` refuses a session
    #[serde(default = "default_fallback_webdriver_urls")]
    pub fallback_webdriver_urls: Vec<String>,

    #[serde(default)]
    pub crawl: CrawlSettings,

    #[serde(default)]
    pub model: ModelSettings,
}

/// Per-crawl browser and breadth settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSettings {
    /// Linked pages visited after the start page
    #[serde(default = "default_max_linked_pages")]
    pub max_linked_pages: usize,

    /// Per-navigation timeout in seconds
    #[serde(default = "default_navigation_timeout_secs")]
    pub navigation_timeout_secs: u64,

    /// User-agent presented by the browser
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Run the browser without a window
    #[serde(default = "default_headless")]
    pub headless: bool,
}

/// Language-model client settings
#[derive(Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    /// API credential; normally supplied through `GEMINI_API_KEY`
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the Generative Language API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_fallback_webdriver_urls() -> Vec<String> {
    vec![
        "http://localhost:9515".to_string(), // ChromeDriver default
        "http://127.0.0.1:4444".to_string(),
    ]
}

fn default_max_linked_pages() -> usize {
    10
}

fn default_navigation_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
        .to_string()
}

fn default_headless() -> bool {
    true
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_api_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            fallback_webdriver_urls: default_fallback_webdriver_urls(),
            crawl: CrawlSettings::default(),
            model: ModelSettings::default(),
        }
    }
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            max_linked_pages: default_max_linked_pages(),
            navigation_timeout_secs: default_navigation_timeout_secs(),
            user_agent: default_user_agent(),
            headless: default_headless(),
        }
    }
}

impl CrawlSettings {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            api_base_url: default_api_base_url(),
        }
    }
}

impl fmt::Debug for ModelSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Defaults, or the given file, with process environment overrides applied
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Override settings from environment variables looked up through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(webdriver_url) = non_empty("WEBDRIVER_URL") {
            self.webdriver_url = webdriver_url;
        }
        if let Some(api_key) = non_empty("GEMINI_API_KEY") {
            self.model.api_key = Some(api_key);
        }
        if let Some(model) = non_empty("GEMINI_MODEL") {
            self.model.model = model;
        }
        if let Some(base_url) = non_empty("GEMINI_API_BASE_URL") {
            self.model.api_base_url = base_url;
        }
    }

    /// Reject configurations the server cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.model.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(()),
            _ => Err(ConfigError::MissingApiKey),
        }
    }
}
