pub mod html;
pub mod text;


use crate::crawlers::crawler::BrowserPage;

/// Extracts the readable text of the page currently loaded in `page`.
///
/// Never fails: a snapshot error is logged and yields an empty string.
pub async fn extract_page_text(page: &mut dyn BrowserPage) -> String {
    match page.content().await {
        Ok(html) => html::extract_main_text(&html),
        Err(e) => {
            ::log::warn!("Text extraction failed, using empty text: {}", e);
            String::new()
        }
    }
}
