//! Shared defaults for the reconciliation engine.
//!
//! Settings override these at runtime; the values here are what a page view
//! gets when no settings file exists.

/// Quiet period after the last tree mutation before a cycle runs (ms).
pub const DEFAULT_MUTATION_DEBOUNCE_MS: u64 = 1000;

/// Delay between a plausible submit and the follow-up cycle (ms).
pub const DEFAULT_SUBMIT_DELAY_MS: u64 = 200;

/// Grace period after an input blur before focus mode re-expands the sidebar (ms).
pub const DEFAULT_BLUR_DEBOUNCE_MS: u64 = 300;

/// Number of words kept in a navigation entry summary.
pub const DEFAULT_SUMMARY_WORDS: usize = 10;

/// Summary shown for an entry whose text is blank.
pub const EMPTY_SUMMARY: &str = "No content";

/// Marker appended to a truncated summary.
pub const SUMMARY_ELLIPSIS: &str = "...";

/// Maximum attempts to locate the layout anchor before giving up.
pub const DEFAULT_LAYOUT_MAX_ATTEMPTS: u32 = 5;

/// Base delay for layout anchor retries (ms).
pub const DEFAULT_LAYOUT_BASE_DELAY_MS: u64 = 250;

/// Ceiling for layout anchor retry delays (ms).
pub const DEFAULT_LAYOUT_MAX_DELAY_MS: u64 = 4000;
