//! Structural markers of the harvested site
//!
//! Every selector the pagination walker and the post extractor rely on lives
//! here. The defaults describe the blog template the harvester was written
//! for; each field can be overridden from the `[template]` config section.

use crate::ConfigError;
use scraper::Selector;
use serde::Deserialize;

/// CSS selectors and text markers describing one site template
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SiteTemplate {
    /// Post title element on a listing page; its first link is the post URL
    pub post_link: String,
    /// Pagination control region on a listing page
    pub pagination: String,
    /// Substring that marks an href as a next-page link
    pub page_marker: String,
    pub title: String,
    pub category: String,
    pub author_heading: String,
    pub author_property: String,
    pub date_published: String,
    /// chrono format of the publish-date text
    pub date_format: String,
    /// Category label used as tag candidate text
    pub categories_label: String,
    pub tag_list: String,
    /// Literal prefix stripped from tag-list text
    pub tag_prefix: String,
    pub article: String,
    pub footer_meta: String,
    pub author_box: String,
}

impl Default for SiteTemplate {
    fn default() -> Self {
        Self {
            post_link: "h2.lb-bold.blog-post-title".to_string(),
            pagination: "div.blog-pagination".to_string(),
            page_marker: "page".to_string(),
            title: "h1.lb-h2.blog-post-title".to_string(),
            category: "h2.lb-h5.blog-title".to_string(),
            author_heading: "h3.lb-h4".to_string(),
            author_property: r#"span[property="author"]"#.to_string(),
            date_published: r#"time[property="datePublished"]"#.to_string(),
            date_format: "%d %b %Y".to_string(),
            categories_label: "span.blog-post-categories".to_string(),
            tag_list: "div.blog-tag-list".to_string(),
            tag_prefix: "TAGS:".to_string(),
            article: "article".to_string(),
            footer_meta: "footer.blog-post-meta".to_string(),
            author_box: "div.blog-author-box".to_string(),
        }
    }
}

/// A `SiteTemplate` with every selector parsed
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    pub post_link: Selector,
    pub link: Selector,
    pub pagination: Selector,
    pub page_marker: String,
    pub title: Selector,
    pub category: Selector,
    pub author_heading: Selector,
    pub author_property: Selector,
    pub date_published: Selector,
    pub date_format: String,
    pub categories_label: Selector,
    pub tag_list: Selector,
    pub tag_prefix: String,
    pub article: Selector,
    pub footer_meta: Selector,
    pub author_box: Selector,
}

impl CompiledTemplate {
    /// Parses every selector of the template
    ///
    /// # Returns
    ///
    /// * `Ok(CompiledTemplate)` - All selectors parsed
    /// * `Err(ConfigError::InvalidSelector)` - The first selector that failed, by field name
    pub fn compile(template: &SiteTemplate) -> Result<Self, ConfigError> {
        if template.page_marker.is_empty() {
            return Err(ConfigError::Validation(
                "template page_marker cannot be empty".to_string(),
            ));
        }
        if template.date_format.is_empty() {
            return Err(ConfigError::Validation(
                "template date_format cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            post_link: parse_selector("post-link", &template.post_link)?,
            link: parse_selector("link", "a[href]")?,
            pagination: parse_selector("pagination", &template.pagination)?,
            page_marker: template.page_marker.clone(),
            title: parse_selector("title", &template.title)?,
            category: parse_selector("category", &template.category)?,
            author_heading: parse_selector("author-heading", &template.author_heading)?,
            author_property: parse_selector("author-property", &template.author_property)?,
            date_published: parse_selector("date-published", &template.date_published)?,
            date_format: template.date_format.clone(),
            categories_label: parse_selector("categories-label", &template.categories_label)?,
            tag_list: parse_selector("tag-list", &template.tag_list)?,
            tag_prefix: template.tag_prefix.clone(),
            article: parse_selector("article", &template.article)?,
            footer_meta: parse_selector("footer-meta", &template.footer_meta)?,
            author_box: parse_selector("author-box", &template.author_box)?,
        })
    }
}

fn parse_selector(field: &str, css: &str) -> Result<Selector, ConfigError> {
    Selector::parse(css)
        .map_err(|e| ConfigError::InvalidSelector(format!("{} = '{}': {:?}", field, css, e)))
}
