//! Run statistics and console reporting
//!
//! This module tallies per-post outcomes during a harvest and prints the
//! progress lines and the final summary.

use std::fmt;

/// Per-post outcome counters of a harvest run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestStats {
    /// Listing pages walked during discovery
    pub pages_visited: usize,

    /// Post links discovered (duplicates included)
    pub posts_discovered: usize,

    /// Posts written to the object store
    pub stored: usize,

    /// Posts whose object already existed
    pub skipped: usize,

    /// Posts whose page could not be fetched
    pub unavailable: usize,

    /// Posts rejected by the extractor
    pub rejected: usize,

    /// Posts that failed to be written
    pub storage_failed: usize,

    /// Record store inserts that failed
    pub record_failures: usize,
}

impl HarvestStats {
    /// Posts processed, whatever their outcome
    pub fn processed(&self) -> usize {
        self.stored + self.skipped + self.unavailable + self.rejected + self.storage_failed
    }
}

impl fmt::Display for HarvestStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} stored, {} skipped, {} unavailable, {} rejected, {} failed",
            self.stored, self.skipped, self.unavailable, self.rejected, self.storage_failed
        )
    }
}

/// Prints the progress line of a stored post
///
/// # Arguments
///
/// * `count` - Running count of stored posts, starting at 1
/// * `key` - Storage key the post was written under
pub fn print_progress(count: usize, key: &str) {
    println!("{}. {}", count, key);
}

/// Prints the final run summary to stdout
pub fn print_summary(stats: &HarvestStats) {
    println!("Completed successfully.");
    println!("Total number of blogs: {}", stats.stored);

    if stats.processed() > stats.stored {
        println!("  Already stored: {}", stats.skipped);
        println!("  Unavailable:    {}", stats.unavailable);
        println!("  Rejected:       {}", stats.rejected);
        println!("  Failed:         {}", stats.storage_failed);
    }
    if stats.record_failures > 0 {
        println!("  Record store failures: {}", stats.record_failures);
    }
}
