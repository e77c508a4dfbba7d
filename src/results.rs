use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Separator written after every page's text block
pub const PAGE_SEPARATOR: &str = "\n\n---\n\n";

/// Appended when a crawl stopped early but still gathered text
pub const INTERRUPTED_MARKER: &str = "\n\n[Crawling interrupted due to an error]";

/// Ordered concatenation of per-page text blocks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombinedText {
    text: String,
    pages: usize,
}

impl CombinedText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one page's text followed by the separator
    pub fn push_page(&mut self, page_text: &str) {
        self.text.push_str(page_text);
        self.text.push_str(PAGE_SEPARATOR);
        self.pages += 1;
    }

    /// Number of pages appended so far
    pub fn pages(&self) -> usize {
        self.pages
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// Close the text with the interrupted marker
    pub fn into_interrupted(mut self) -> String {
        self.text.push_str(INTERRUPTED_MARKER);
        self.text
    }
}

/// Flattened dependency versions, or a diagnostic explaining why there are none
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PackageVersions {
    Versions(BTreeMap<String, String>),
    Diagnostic(String),
}

impl PackageVersions {
    pub fn diagnostic(message: impl Into<String>) -> Self {
        PackageVersions::Diagnostic(message.into())
    }

    pub fn as_versions(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            PackageVersions::Versions(map) => Some(map),
            PackageVersions::Diagnostic(_) => None,
        }
    }
}

/// Result payload of the `get_doc_summary` tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocSummary {
    /// Summary text, or a descriptive message when no summary was produced
    pub summary: String,

    /// Dependency versions read from the manifest file
    pub package_versions: PackageVersions,

    /// URL the caller asked for, as given
    pub original_url: String,
}
