//! Reference deduplication.

use std::collections::HashSet;

use tracing::debug;

/// Collapses a sequence of references into its unique elements.
///
/// Only exact string duplicates are removed; no normalization is applied.
/// The output keeps the first-seen order of the input so persisted lists
/// and reports are reproducible between runs.
///
/// # Examples
///
/// ```
/// use workshop_core::dedupe;
///
/// let unique = dedupe(["http://x/?id=1", "http://x/?id=1", "http://x/?id=2"]);
/// assert_eq!(unique, vec!["http://x/?id=1", "http://x/?id=2"]);
/// ```
#[must_use]
pub fn dedupe<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    let mut total = 0_usize;

    for item in items {
        total += 1;
        let item = item.into();
        if seen.insert(item.clone()) {
            unique.push(item);
        }
    }

    debug!(total, unique = unique.len(), "deduplicated references");
    unique
}
