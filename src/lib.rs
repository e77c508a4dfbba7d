pub mod config;
pub mod crawlers;
pub mod dependencies;
pub mod error;
pub mod filter;
pub mod parsers;
pub mod results;
pub mod server;
pub mod shutdown;
pub mod summarizer;
pub mod tool;

// Re-export commonly used types for convenience
pub use config::ServerConfig;
pub use crawlers::{BoundedCrawler, WebDriverLauncher};
pub use results::{DocSummary, PackageVersions};
pub use server::McpServer;
pub use summarizer::{GeminiClient, Summarizer};
pub use tool::{DocSummaryRequest, DocSummaryTool};
