//! Timer settings for change detection and layout adjustment.

use serde::{Deserialize, Serialize};
use turnmark_core::constants::{
    DEFAULT_BLUR_DEBOUNCE_MS, DEFAULT_LAYOUT_BASE_DELAY_MS, DEFAULT_LAYOUT_MAX_ATTEMPTS,
    DEFAULT_LAYOUT_MAX_DELAY_MS, DEFAULT_MUTATION_DEBOUNCE_MS, DEFAULT_SUBMIT_DELAY_MS,
};

/// Change-detection scheduler delays.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchedulerSettings {
    /// Quiet period after the last tree mutation before a cycle runs.
    pub mutation_debounce_ms: u64,
    /// Delay between a plausible submit and its follow-up cycle.
    pub submit_delay_ms: u64,
    /// Grace period after an input blur before focus mode re-expands.
    pub blur_debounce_ms: u64,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            mutation_debounce_ms: DEFAULT_MUTATION_DEBOUNCE_MS,
            submit_delay_ms: DEFAULT_SUBMIT_DELAY_MS,
            blur_debounce_ms: DEFAULT_BLUR_DEBOUNCE_MS,
        }
    }
}

/// Retry policy for locating the host's scroll container.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutSettings {
    /// Attempts before the adjustment is abandoned.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles per attempt.
    pub base_delay_ms: u64,
    /// Upper bound for a single retry delay.
    pub max_delay_ms: u64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_LAYOUT_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_LAYOUT_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_LAYOUT_MAX_DELAY_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduler_defaults() {
        let s = SchedulerSettings::default();
        assert_eq!(s.mutation_debounce_ms, 1000);
        assert_eq!(s.submit_delay_ms, 200);
        assert_eq!(s.blur_debounce_ms, 300);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let s: SchedulerSettings = serde_json::from_str(r#"{"submitDelayMs": 50}"#).unwrap();
        assert_eq!(s.submit_delay_ms, 50);
        assert_eq!(s.mutation_debounce_ms, 1000);
    }

    #[test]
    fn layout_serializes_camel_case() {
        let json = serde_json::to_value(LayoutSettings::default()).unwrap();
        assert_eq!(json["maxAttempts"], 5);
        assert_eq!(json["baseDelayMs"], 250);
        assert_eq!(json["maxDelayMs"], 4000);
    }
}
