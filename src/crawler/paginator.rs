//! Pagination walker
//!
//! Starting from a seed listing page, this module:
//! - harvests the post links of every listing page in document order
//! - follows the next-page link of the pagination control
//! - stops on fetch failure, missing next page, a revisited page or the page limit

use crate::crawler::fetcher::PageFetcher;
use crate::crawler::template::CompiledTemplate;
use scraper::Html;
use url::Url;

/// A discovered post URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostReference {
    pub url: Url,
}

/// Outcome of a pagination walk
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Post links in page-traversal order, duplicates across pages kept
    pub posts: Vec<PostReference>,

    /// Listing pages that were requested, in order
    pub pages_visited: Vec<Url>,
}

/// Walks the paginated listing starting at `seed`
///
/// # Algorithm
///
/// 1. Record the current page as visited and fetch it; stop if unavailable
/// 2. Append every post link on the page
/// 3. Find the next-page link; stop if there is none
/// 4. Stop if the next page was already visited (cycle guard)
/// 5. Stop if `max_pages` listing pages have been walked
///
/// Partial results are returned when a page fails to load.
pub async fn discover(
    fetcher: &mut PageFetcher,
    template: &CompiledTemplate,
    seed: &Url,
    max_pages: Option<u32>,
) -> Discovery {
    let mut discovery = Discovery::default();
    let mut current = seed.clone();

    loop {
        discovery.pages_visited.push(current.clone());

        let page = match fetcher.fetch_document(&current).await {
            Some(page) => page,
            None => {
                tracing::warn!(page = %current, "Listing page unavailable, stopping pagination");
                break;
            }
        };

        let links = harvest_post_links(&page.document, &page.url, template);
        tracing::debug!(page = %page.url, count = links.len(), "Harvested post links");
        discovery.posts.extend(links);

        let next = match find_next_page(&page.document, &page.url, template) {
            Some(next) => next,
            None => break,
        };

        if discovery.pages_visited.contains(&next) {
            tracing::debug!(page = %next, "Next page already visited, stopping pagination");
            break;
        }

        if let Some(limit) = max_pages {
            if discovery.pages_visited.len() >= limit as usize {
                tracing::info!(limit, "Listing page limit reached, stopping pagination");
                break;
            }
        }

        current = next;
    }

    tracing::info!(
        pages = discovery.pages_visited.len(),
        posts = discovery.posts.len(),
        "Discovery finished"
    );

    discovery
}

/// Extracts the link of every post title element, in document order
///
/// A title element without a usable link is skipped.
pub fn harvest_post_links(
    document: &Html,
    base_url: &Url,
    template: &CompiledTemplate,
) -> Vec<PostReference> {
    let mut posts = Vec::new();

    for title in document.select(&template.post_link) {
        let href = title
            .select(&template.link)
            .next()
            .and_then(|a| a.value().attr("href"));

        match href.and_then(|href| resolve_link(href, base_url)) {
            Some(url) => posts.push(PostReference { url }),
            None => tracing::warn!(page = %base_url, "Post title element without a usable link"),
        }
    }

    posts
}

/// Finds the next listing page, if any
///
/// The first link inside a pagination region decides: it is the next page
/// when its target contains the page marker, otherwise there is none.
pub fn find_next_page(document: &Html, base_url: &Url, template: &CompiledTemplate) -> Option<Url> {
    let region = document.select(&template.pagination).next()?;
    let href = region.select(&template.link).next()?.value().attr("href")?;

    if !href.contains(template.page_marker.as_str()) {
        return None;
    }

    resolve_link(href, base_url)
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url),
        _ => None,
    }
}
