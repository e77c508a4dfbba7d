pub mod bounded;
pub mod crawler;
pub mod web;

pub use bounded::BoundedCrawler;
pub use crawler::{BrowserLauncher, BrowserPage};
pub use web::WebDriverLauncher;
