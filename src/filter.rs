use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use url::{Origin, Url};

/// Path prefix that narrows a crawl to a documentation section
const DOCS_PREFIX: &str = "/docs";

/// File extensions that are never worth navigating to
static DENYLISTED_EXTENSIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(pdf|zip|jpg|jpeg|png|gif|svg|webp|ico|css|js)$").unwrap()
});

/// Start URL of a crawl with its derived scope
#[derive(Debug, Clone)]
pub struct CrawlTarget {
    start_url: Url,
    origin: Origin,
    allowed_path_prefix: String,
}

impl CrawlTarget {
    /// Derive the origin and allowed path prefix from a start URL
    pub fn new(start_url: Url) -> Self {
        let allowed_path_prefix = if start_url.path().starts_with(DOCS_PREFIX) {
            DOCS_PREFIX.to_string()
        } else {
            "/".to_string()
        };

        Self {
            origin: start_url.origin(),
            start_url,
            allowed_path_prefix,
        }
    }

    pub fn start_url(&self) -> &Url {
        &self.start_url
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn allowed_path_prefix(&self) -> &str {
        &self.allowed_path_prefix
    }
}

/// URL filter deciding which discovered links stay inside the crawl scope
#[derive(Debug)]
pub struct UrlFilter {
    origin: Origin,
    required_path_prefix: String,
}

impl UrlFilter {
    /// Create a filter scoped to a crawl target
    pub fn for_target(target: &CrawlTarget) -> Self {
        Self {
            origin: target.origin().clone(),
            required_path_prefix: target.allowed_path_prefix().to_string(),
        }
    }

    /// Determine if a URL passes the origin, path and extension rules
    pub fn should_crawl(&self, url: &Url) -> bool {
        if !self.is_in_origin_scope(url) {
            return false;
        }

        if !self.is_in_path_scope(url) {
            return false;
        }

        !DENYLISTED_EXTENSIONS.is_match(url.path())
    }

    /// Same scheme, host and port as the start URL
    fn is_in_origin_scope(&self, url: &Url) -> bool {
        url.origin() == self.origin
    }

    fn is_in_path_scope(&self, url: &Url) -> bool {
        url.path().starts_with(&self.required_path_prefix)
    }
}

/// Create a normalized version of the URL (fragment removed)
pub fn normalize_url(url: &Url) -> Url {
    let mut normalized = url.clone();
    normalized.set_fragment(None);
    normalized
}

/// URLs already navigated to or queued during one crawl
#[derive(Debug, Default)]
pub struct VisitedSet {
    seen: HashSet<String>,
}

impl VisitedSet {
    /// Record a URL; returns false if it was already present
    pub fn insert(&mut self, url: &Url) -> bool {
        self.seen.insert(normalize_url(url).into())
    }

    pub fn contains(&self, url: &Url) -> bool {
        self.seen.contains(normalize_url(url).as_str())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Resolve raw hrefs against the page URL and keep the in-scope, unseen ones.
///
/// Accepted links are marked visited immediately so that a link repeated on
/// the page is only queued once. Discovery order is preserved.
pub fn discover_links(
    page_url: &Url,
    hrefs: &[String],
    filter: &UrlFilter,
    visited: &mut VisitedSet,
) -> Vec<Url> {
    let mut queue = Vec::new();

    for href in hrefs {
        let Ok(resolved) = page_url.join(href) else {
            ::log::trace!("Ignoring unresolvable link: {}", href);
            continue;
        };
        let candidate = normalize_url(&resolved);

        if !filter.should_crawl(&candidate) {
            ::log::debug!("URL filter rejected: {}", candidate);
            continue;
        }

        if !visited.insert(&candidate) {
            ::log::debug!("Skipping already visited or queued link: {}", candidate);
            continue;
        }

        ::log::debug!("Queuing link for crawling: {}", candidate);
        queue.push(candidate);
    }

    queue
}
