//! Output module for console reporting
//!
//! This module handles:
//! - Progress lines and the final summary of a harvest run
//! - Listings of stored objects
//! - Record store query results

pub mod stats;

pub use stats::{print_progress, print_summary, HarvestStats};

use crate::records::StoredPost;
use crate::storage::ObjectInfo;

/// Prints a listing of stored objects, one per line
///
/// # Arguments
///
/// * `objects` - Objects as returned by `ObjectStore::list`
pub fn print_object_listing(objects: &[ObjectInfo]) {
    for object in objects {
        let modified = object
            .last_modified
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{:>10}  {}  {}", object.size, modified, object.key);
    }
    println!("{} objects", objects.len());
}

/// Prints record store query results
pub fn print_query_results(posts: &[StoredPost]) {
    for post in posts {
        println!("{} | {}", post.date_published, post.blog_title);
        println!("  category: {}", post.category);
        println!("  authors:  {}", join(&post.authors));
        println!("  tags:     {}", join(&post.tags));
        println!("  source:   {}", post.source_url);
        println!("  object:   {}", post.object_key);
    }
    println!("{} records", posts.len());
}

fn join<'a>(values: impl IntoIterator<Item = &'a String>) -> String {
    values
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
