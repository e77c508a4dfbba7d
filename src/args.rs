use clap::{Parser, Subcommand};
use doc_summary::ServerConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "doc-summary")]
#[command(about = "MCP tool server that crawls documentation and summarizes it")]
#[command(version)]
pub struct Args {
    /// JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// WebDriver server URL (overrides config and WEBDRIVER_URL)
    #[arg(long, global = true)]
    pub webdriver_url: Option<String>,

    /// Gemini model identifier
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Linked pages visited after the start page
    #[arg(long, global = true)]
    pub max_pages: Option<usize>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Serve the get_doc_summary tool over stdio (default)
    Serve,

    /// Summarize one documentation URL and print the result
    Summarize {
        /// Documentation URL to start from
        url: String,

        /// package.json-style manifest to read dependency versions from
        #[arg(long)]
        dependency_file: Option<String>,
    },
}

impl Args {
    /// Apply command-line overrides on top of file and environment settings
    pub fn apply_to(&self, config: &mut ServerConfig) {
        if let Some(webdriver_url) = &self.webdriver_url {
            config.webdriver_url = webdriver_url.clone();
        }
        if let Some(model) = &self.model {
            config.model.model = model.clone();
        }
        if let Some(max_pages) = self.max_pages {
            config.crawl.max_linked_pages = max_pages;
        }
    }

    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }
}
