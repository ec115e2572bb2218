//! Client-side story filtering.
//!
//! Pure functions only: the UI recomputes the visible list from the full
//! collection and the current query, so filtering never mutates state and
//! never reorders stories.

use crate::api::Story;

/// Filter stories by case-insensitive substring match on title or category.
///
/// An empty (or whitespace-only) query returns the collection unchanged.
/// Matching preserves the original relative order; there is no ranking.
pub fn filter_stories(stories: &[Story], query: &str) -> Vec<Story> {
    let needle = normalize_query(query);
    if needle.is_empty() {
        return stories.to_vec();
    }

    stories
        .iter()
        .filter(|story| {
            story.title.to_lowercase().contains(&needle)
                || story.category.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// Lower-case the query, trim it, and collapse internal whitespace runs to
/// a single space, so `"water    solutions"` matches the same stories as
/// `"water solutions"`.
pub fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

// ============================================================================
// Tests
// ============================================================================
