//! Single-post extraction
//!
//! Reads the metadata of a post from its structural markers, then detaches
//! the boilerplate regions and collects the article text as the body.

use crate::crawler::CompiledTemplate;
use crate::extract::tags::{explicit_tag, merge_tags, TagDictionary};
use crate::extract::{ExtractError, PostRecord};
use crate::storage::slugify;
use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeSet;
use url::Url;

/// Extracts a `PostRecord` from the document of a single post
///
/// Metadata is read from the intact document. The footer-meta, author-box
/// and tag-list regions are then detached from `document` so the body text
/// only holds the article itself.
///
/// # Errors
///
/// * `ExtractError::StructuralMismatch` - category, title, authors, publish
///   date or article element could not be located, or the title has no
///   word characters
/// * `ExtractError::DateFormat` - the publish-date text does not match the
///   template's date format
///
/// A post without any tag is not an error; its tag set is empty.
pub fn extract_post(
    document: &mut Html,
    source_url: &Url,
    template: &CompiledTemplate,
    dictionary: &TagDictionary,
) -> Result<PostRecord, ExtractError> {
    let url = source_url.as_str();

    let category = first_text(document, &template.category)
        .ok_or_else(|| mismatch(url, "category"))?
        .to_lowercase();
    let title = first_text(document, &template.title)
        .ok_or_else(|| mismatch(url, "title"))?
        .to_lowercase();
    // A title made only of symbols cannot name a stored object
    if slugify(&title).is_empty() {
        return Err(mismatch(url, "title"));
    }

    // Either author source may be present depending on the template era
    let authors: BTreeSet<String> = document
        .select(&template.author_heading)
        .chain(document.select(&template.author_property))
        .map(|element| collapsed_text(element).to_lowercase())
        .filter(|author| !author.is_empty())
        .collect();
    if authors.is_empty() {
        return Err(mismatch(url, "authors"));
    }

    let date_text = first_text(document, &template.date_published)
        .ok_or_else(|| mismatch(url, "publish date"))?;
    let date_published = NaiveDate::parse_from_str(&date_text, &template.date_format)
        .map_err(|source| ExtractError::DateFormat {
            url: url.to_string(),
            text: date_text.clone(),
            source,
        })?;

    let label = first_text(document, &template.categories_label).unwrap_or_default();
    let candidate = format!("{}, {}", label.to_lowercase(), title);
    let keyword_tags = dictionary.match_keywords(&candidate);

    let explicit_tags: Vec<String> = document
        .select(&template.tag_list)
        .filter_map(|region| explicit_tag(&collapsed_text(region), &template.tag_prefix))
        .collect();

    let tags = merge_tags(keyword_tags, explicit_tags);
    if tags.is_empty() {
        tracing::debug!(url, "No tags found for post");
    }

    strip_regions(
        document,
        &[&template.footer_meta, &template.author_box, &template.tag_list],
    );

    let body = document
        .select(&template.article)
        .next()
        .map(|article| article.text().collect::<String>().trim().to_string())
        .ok_or_else(|| mismatch(url, "article"))?;

    Ok(PostRecord {
        category,
        title,
        authors,
        date_published,
        tags,
        source_url: url.to_string(),
        body,
    })
}

fn mismatch(url: &str, field: &'static str) -> ExtractError {
    ExtractError::StructuralMismatch {
        url: url.to_string(),
        field,
    }
}

/// Text of the first matching element; empty text counts as absent
fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .map(collapsed_text)
        .filter(|text| !text.is_empty())
}

/// Element text with runs of whitespace collapsed to one space
fn collapsed_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Detaches every element matching one of `selectors` from the tree
fn strip_regions(document: &mut Html, selectors: &[&Selector]) {
    let ids: Vec<_> = selectors
        .iter()
        .flat_map(|selector| document.select(selector).map(|element| element.id()))
        .collect();

    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}
