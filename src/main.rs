use clap::Parser;
use doc_summary::shutdown::{Shutdown, termination_signal};
use doc_summary::{
    BoundedCrawler, DocSummaryRequest, DocSummaryTool, GeminiClient, McpServer, ServerConfig,
    Summarizer, WebDriverLauncher,
};
use std::sync::Arc;
use tokio::io::BufReader;

mod args;
use args::{Args, Command};

#[tokio::main]
async fn main() {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries the protocol
    env_logger::init();

    let args = Args::parse();

    let mut config = match ServerConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("{}", e);
            std::process::exit(1);
        }
    };
    args.apply_to(&mut config);

    if let Err(e) = config.validate() {
        ::log::error!("{}", e);
        std::process::exit(1);
    }

    let Some(model) = GeminiClient::from_settings(&config.model) else {
        ::log::error!("No Gemini API key configured");
        std::process::exit(1);
    };
    ::log::info!("Using model endpoint {}", model.endpoint());

    let (trigger, shutdown) = Shutdown::channel();
    tokio::spawn(async move {
        termination_signal().await;
        trigger.trigger();
    });

    let launcher = Arc::new(WebDriverLauncher::from_config(&config));
    let crawler =
        BoundedCrawler::new(launcher, config.crawl.clone()).with_shutdown(shutdown.clone());
    let tool = DocSummaryTool::new(crawler, Summarizer::new(Arc::new(model)))
        .with_shutdown(shutdown.clone());

    match args.command() {
        Command::Serve => {
            let server = McpServer::new(tool);
            let stdin = BufReader::new(tokio::io::stdin());
            let stopped_by_signal = shutdown.clone();
            if let Err(e) = server.serve(stdin, tokio::io::stdout(), shutdown).await {
                ::log::error!("Server stopped on I/O error: {}", e);
                std::process::exit(1);
            }
            ::log::info!("Server stopped");

            // A pending stdin read would otherwise keep the runtime alive
            if stopped_by_signal.is_triggered() {
                std::process::exit(0);
            }
        }
        Command::Summarize {
            url,
            dependency_file,
        } => {
            let mut request = DocSummaryRequest::new(url);
            if let Some(path) = dependency_file {
                request = request.dependency_file(path);
            }

            let result = match tool.execute(request).await {
                Ok(result) => result,
                Err(e) => {
                    ::log::error!("{}", e);
                    std::process::exit(1);
                }
            };

            match serde_json::to_string_pretty(&result) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    ::log::error!("Failed to serialize result: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}
