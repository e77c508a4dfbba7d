//! The `get_doc_summary` tool: validate → crawl → summarize → dependencies → assemble

use crate::crawlers::BoundedCrawler;
use crate::dependencies::{self, NO_DEPENDENCY_FILE_MESSAGE};
use crate::error::ToolError;
use crate::error::SummarizeError;
use crate::results::{DocSummary, PackageVersions};
use crate::shutdown::Shutdown;
use crate::summarizer::Summarizer;
use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

/// Tool name exposed to the host
pub const TOOL_NAME: &str = "get_doc_summary";

/// Tool description exposed to the host, for a crawl of `max_linked_pages` links
pub fn tool_description(max_linked_pages: usize) -> String {
    format!(
        "Crawls a documentation page and up to {} linked pages in the same section, then \
         returns an AI-generated summary of API usage, implementation patterns, configuration \
         and gotchas. Optionally reads dependency versions from a package.json-style file \
         relative to the server's working directory.",
        max_linked_pages
    )
}

/// Arguments of a `get_doc_summary` call
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocSummaryRequest {
    /// Documentation URL to start crawling from (http or https)
    pub url: String,

    /// Path to a JSON manifest (e.g. package.json), relative to the server's working directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_file: Option<String>,
}

impl DocSummaryRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn dependency_file(mut self, path: impl Into<String>) -> Self {
        self.dependency_file = Some(path.into());
        self
    }

    /// Decode raw call arguments
    pub fn from_arguments(arguments: Value) -> Result<Self, ToolError> {
        serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments(e.to_string()))
    }

    /// Parse and check the start URL
    pub fn validate(&self) -> Result<Url, ToolError> {
        let url = Url::parse(self.url.trim()).map_err(|e| {
            ToolError::InvalidArguments(format!("invalid url '{}': {}", self.url, e))
        })?;

        match url.scheme() {
            "http" | "https" if url.has_host() => Ok(url),
            scheme => Err(ToolError::InvalidArguments(format!(
                "invalid url '{}': expected an http or https URL, got scheme '{}'",
                self.url, scheme
            ))),
        }
    }
}

/// JSON schema of the tool input
pub fn input_schema() -> Value {
    let schema = schema_for!(DocSummaryRequest);
    let mut value = serde_json::to_value(schema).unwrap_or_default();

    if let Some(url) = value.pointer_mut("/properties/url").and_then(Value::as_object_mut) {
        url.insert("format".to_string(), Value::String("uri".to_string()));
    }

    value
}

/// Crawler, summarizer and dependency reader wired together
pub struct DocSummaryTool {
    crawler: BoundedCrawler,
    summarizer: Summarizer,
    shutdown: Shutdown,
}

impl DocSummaryTool {
    pub fn new(crawler: BoundedCrawler, summarizer: Summarizer) -> Self {
        Self {
            crawler,
            summarizer,
            shutdown: Shutdown::never(),
        }
    }

    /// Abandon a pending model call when the process is asked to stop
    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn description(&self) -> String {
        tool_description(self.crawler.settings().max_linked_pages)
    }

    /// Decode and run a call from raw JSON arguments
    pub async fn call(&self, arguments: Value) -> Result<DocSummary, ToolError> {
        let request = DocSummaryRequest::from_arguments(arguments)?;
        self.execute(request).await
    }

    pub async fn execute(&self, request: DocSummaryRequest) -> Result<DocSummary, ToolError> {
        let start_url = request.validate()?;
        ::log::info!("Summarizing documentation at {}", start_url);

        let combined = self.crawler.crawl(&start_url).await?;

        let mut shutdown = self.shutdown.clone();
        let summary = tokio::select! {
            summary = self.summarizer.summarize(&combined) => summary?,
            _ = shutdown.wait() => {
                ::log::warn!("Shutdown requested, abandoning summary of {}", start_url);
                return Err(SummarizeError::Cancelled.into());
            }
        };

        let package_versions = match request.dependency_file.as_deref() {
            Some(path) => dependencies::read_dependencies(path),
            None => PackageVersions::diagnostic(NO_DEPENDENCY_FILE_MESSAGE),
        };

        Ok(DocSummary {
            summary: summary.into(),
            package_versions,
            original_url: request.url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_accepts_http_urls() {
        let url = DocSummaryRequest::new("https://x.test/docs/a#intro").validate().unwrap();
        assert_eq!(url.as_str(), "https://x.test/docs/a#intro");
        assert!(DocSummaryRequest::new("http://localhost:8080/").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        for bad in ["", "not a url", "/docs/relative", "ftp://x.test/docs", "mailto:a@x.test"] {
            let err = DocSummaryRequest::new(bad).validate().unwrap_err();
            assert!(matches!(err, ToolError::InvalidArguments(_)), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_arguments_shape() {
        let request = DocSummaryRequest::from_arguments(json!({
            "url": "https://x.test/docs",
            "dependencyFile": "package.json"
        }))
        .unwrap();
        assert_eq!(request.dependency_file.as_deref(), Some("package.json"));

        assert!(DocSummaryRequest::from_arguments(json!({})).is_err());
        assert!(DocSummaryRequest::from_arguments(json!({ "url": 42 })).is_err());
        assert!(
            DocSummaryRequest::from_arguments(json!({
                "url": "https://x.test",
                "dependencyFile": ["a"]
            }))
            .is_err()
        );
        assert!(DocSummaryRequest::from_arguments(json!("https://x.test")).is_err());
    }

    #[test]
    fn test_description_follows_page_limit() {
        assert!(tool_description(10).contains("up to 10 linked pages"));
        assert!(tool_description(3).contains("up to 3 linked pages"));
    }

    #[test]
    fn test_input_schema() {
        let schema = input_schema();
        assert_eq!(schema["type"], json!("object"));
        assert_eq!(schema["properties"]["url"]["format"], json!("uri"));
        assert!(schema["properties"]["dependencyFile"].is_object());
        assert_eq!(schema["required"], json!(["url"]));
    }
}
