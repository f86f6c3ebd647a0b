//! Text helpers for turn summaries and search.
//!
//! Rust `&str[..n]` panics when `n` falls inside a multi-byte character, so
//! every byte-bounded cut goes through [`truncate_str`]. Summaries are cut on
//! word boundaries instead and never split a character.

use crate::constants::{EMPTY_SUMMARY, SUMMARY_ELLIPSIS};

/// Truncate a string to at most `max_bytes` bytes at a char boundary.
///
/// Returns the longest prefix of `s` whose byte length is ≤ `max_bytes`
/// and that does not split a multi-byte character.
#[inline]
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Build the short label for a navigation entry.
///
/// Keeps the first `max_words` whitespace-separated words joined by single
/// spaces and appends `...` when words were dropped. Blank text maps to the
/// `No content` sentinel.
pub fn summarize(text: &str, max_words: usize) -> String {
    let mut words = text.split_whitespace();
    let kept: Vec<&str> = words.by_ref().take(max_words).collect();
    if kept.is_empty() {
        return EMPTY_SUMMARY.to_string();
    }
    let mut summary = kept.join(" ");
    if words.next().is_some() {
        summary.push_str(SUMMARY_ELLIPSIS);
    }
    summary
}

/// Case-insensitive substring test.
///
/// `needle_lower` must already be lowercased; callers lowercase the query
/// once per filter pass rather than once per entry.
pub fn contains_folded(haystack: &str, needle_lower: &str) -> bool {
    if needle_lower.is_empty() {
        return true;
    }
    haystack.to_lowercase().contains(needle_lower)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ── truncate_str ─────────────────────────────────────────────────────

    #[test]
    fn ascii_within_limit() {
        assert_eq!(truncate_str("hello", 10), "hello");
    }

    #[test]
    fn ascii_truncated() {
        assert_eq!(truncate_str("hello world", 5), "hello");
    }

    #[test]
    fn em_dash_boundary_inside() {
        let s = "ab—cd";
        assert_eq!(truncate_str(s, 3), "ab");
        assert_eq!(truncate_str(s, 5), "ab—");
    }

    #[test]
    fn zero_max() {
        assert_eq!(truncate_str("hello", 0), "");
    }

    // ── summarize ────────────────────────────────────────────────────────

    #[test]
    fn short_text_is_unchanged() {
        assert_eq!(
            summarize("Explain recursion in simple terms please", 10),
            "Explain recursion in simple terms please"
        );
    }

    #[test]
    fn exactly_max_words_has_no_ellipsis() {
        let text = "one two three four five six seven eight nine ten";
        assert_eq!(summarize(text, 10), text);
    }

    #[test]
    fn long_text_is_cut_with_ellipsis() {
        let text = "one two three four five six seven eight nine ten eleven";
        assert_eq!(
            summarize(text, 10),
            "one two three four five six seven eight nine ten..."
        );
    }

    #[test]
    fn whitespace_runs_collapse() {
        assert_eq!(summarize("  hello \n\t world  ", 10), "hello world");
    }

    #[test]
    fn blank_text_maps_to_sentinel() {
        assert_eq!(summarize("", 10), "No content");
        assert_eq!(summarize("   \n ", 10), "No content");
    }

    #[test]
    fn multibyte_words_are_kept_whole() {
        assert_eq!(summarize("café — naïve", 2), "café —...");
    }

    // ── contains_folded ──────────────────────────────────────────────────

    #[test]
    fn folded_match_ignores_case() {
        assert!(contains_folded("Explain RECURSION", "recursion"));
        assert!(!contains_folded("Explain recursion", "loops"));
    }

    #[test]
    fn empty_needle_matches_everything() {
        assert!(contains_folded("anything", ""));
    }

    proptest! {
        #[test]
        fn summary_never_exceeds_word_limit(text in ".{0,200}", words in 1usize..20) {
            prop_assume!(!text.trim().is_empty());
            let summary = summarize(&text, words);
            let body = summary.trim_end_matches(SUMMARY_ELLIPSIS);
            prop_assert!(body.split_whitespace().count() <= words);
        }

        #[test]
        fn truncate_is_prefix(text in ".{0,64}", max in 0usize..80) {
            let cut = truncate_str(&text, max);
            prop_assert!(text.starts_with(cut));
            prop_assert!(cut.len() <= max);
        }
    }
}
